//! studioboard-types - Shared data types for studioboard
//!
//! This crate contains pure data structures without heavy dependencies.
//! No tokio, no async runtime - just serde-serializable types.
//!
//! Used by:
//! - studioboard-core (allocation, aggregation, loading)
//! - studioboard (CLI)

pub mod models;

pub use models::{
    CapacityStatus, Client, DailySplit, DateRange, MonthKey, MonthSummary, ResolvedRetainer,
    RetainerConfig, RetainerReport, TimeEntry, DEFAULT_HOURS_PER_DAY,
};
