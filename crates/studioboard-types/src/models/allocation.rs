//! Derived allocation results: per-day splits, month summaries, full reports

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::period::{DateRange, MonthKey};

/// How one day's logged hours were charged
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySplit {
    /// Hours charged to the monthly allocation
    pub monthly_hours_used: f64,
    /// Hours drawn from the rollover pool
    pub rollover_hours_used: f64,
    /// Everything logged that day
    pub total_hours: f64,
}

impl DailySplit {
    /// Hours neither pool could absorb.
    ///
    /// Zero unless the daily cap and the rollover budget were both exhausted.
    pub fn unaccounted_hours(&self) -> f64 {
        (self.total_hours - self.monthly_hours_used - self.rollover_hours_used).max(0.0)
    }

    pub fn is_fully_accounted(&self) -> bool {
        self.unaccounted_hours() == 0.0
    }
}

/// Monthly capacity state, used for color coding in the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CapacityStatus {
    /// Client has no monthly allowance configured
    NoAllowance,
    /// Hours left in the month
    Under,
    /// Exactly at the allowance
    AtCapacity,
    /// Logged past the allowance
    Over,
}

impl CapacityStatus {
    pub fn from_remaining(remaining: Option<f64>) -> Self {
        match remaining {
            None => CapacityStatus::NoAllowance,
            Some(r) if r > 0.0 => CapacityStatus::Under,
            Some(r) if r == 0.0 => CapacityStatus::AtCapacity,
            Some(_) => CapacityStatus::Over,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CapacityStatus::NoAllowance => "no allowance",
            CapacityStatus::Under => "under",
            CapacityStatus::AtCapacity => "at capacity",
            CapacityStatus::Over => "over",
        }
    }
}

/// Totals for one calendar month of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    pub month: MonthKey,
    pub total_hours: f64,
    /// `total_hours` expressed in retainer days
    pub total_days: f64,
    pub rollover_hours: f64,
    pub rollover_days: f64,
    pub unaccounted_hours: f64,
    /// Number of distinct days with entries
    pub days_logged: usize,
    pub monthly_hours: Option<f64>,
    /// `monthly_hours - total_hours`; negative means the month is over
    pub capacity_remaining: Option<f64>,
    pub status: CapacityStatus,
}

/// Complete allocation report for one client and date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetainerReport {
    pub client_id: String,
    pub client_name: String,
    pub period: DateRange,
    /// Keyed by ISO date (`YYYY-MM-DD`)
    pub daily: BTreeMap<NaiveDate, DailySplit>,
    pub months: Vec<MonthSummary>,
    pub hours_per_day: f64,
    pub rollover_budget: f64,
    pub rollover_used: f64,
    pub rollover_remaining: f64,
    /// Informational agreed-days text, never used in the math
    #[serde(default)]
    pub agreed_days: Option<String>,
}

impl RetainerReport {
    pub fn total_hours(&self) -> f64 {
        self.daily.values().map(|d| d.total_hours).sum()
    }

    pub fn month(&self, month: MonthKey) -> Option<&MonthSummary> {
        self.months.iter().find(|m| m.month == month)
    }
}
