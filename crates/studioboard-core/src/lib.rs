//! studioboard-core - Core library for studioboard
//!
//! Provides the retainer capacity allocator, month aggregates and forecast,
//! plus loading, settings and export around them.

pub mod allocation;
pub mod error;
pub mod export;
pub mod forecast;
pub mod parsers;
pub mod settings;
pub mod store;

pub use allocation::{allocate, allocate_with_scope, Allocation, RolloverScope};
pub use error::{CoreError, DegradedState, LoadReport};
pub use export::{export_daily_splits_to_csv, export_months_to_markdown, export_report_to_json};
pub use forecast::{forecast_month, CapacityForecast, FillLikelihood};
pub use settings::{ForecastThresholds, StudioSettings};
pub use store::DataStore;
