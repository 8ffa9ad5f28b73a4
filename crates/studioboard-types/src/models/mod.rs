//! Data models for studioboard

pub mod allocation;
pub mod period;
pub mod retainer;

pub use allocation::{CapacityStatus, DailySplit, MonthSummary, RetainerReport};
pub use period::{DateRange, MonthKey};
pub use retainer::{Client, ResolvedRetainer, RetainerConfig, TimeEntry, DEFAULT_HOURS_PER_DAY};
