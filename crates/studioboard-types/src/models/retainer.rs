//! Retainer configuration, clients, and logged time entries

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Hours per day used when a retainer leaves `hours_per_day` unset
pub const DEFAULT_HOURS_PER_DAY: f64 = 6.0;

/// Retainer terms agreed with a client
///
/// Every field is optional because the upstream data layer stores partial
/// configurations. Use [`RetainerConfig::resolve`] before doing any arithmetic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetainerConfig {
    /// Monthly hour allowance
    #[serde(default)]
    pub monthly_hours: Option<f64>,

    /// Rollover hours available for the whole reporting period
    #[serde(default)]
    pub rollover_hours: Option<f64>,

    /// Daily cap charged to the monthly pool (defaults to 6)
    #[serde(default)]
    pub hours_per_day: Option<f64>,

    /// Informational only, never feeds the daily cap
    #[serde(default)]
    pub agreed_days_per_week: Option<f64>,

    /// Informational only, never feeds the daily cap
    #[serde(default)]
    pub agreed_days_per_month: Option<f64>,

    /// Retainer start date
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

/// Retainer terms with every default applied
///
/// Produced by [`RetainerConfig::resolve`]; all fields are finite numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRetainer {
    /// `None` when the client has no monthly allowance
    pub monthly_hours: Option<f64>,
    pub rollover_budget: f64,
    pub hours_per_day: f64,
}

impl ResolvedRetainer {
    /// Daily cap handed to the allocator. A value `<= 0` selects monthly-only accounting.
    pub fn daily_allocation(&self) -> f64 {
        self.hours_per_day
    }
}

impl RetainerConfig {
    /// Apply defaults: missing `hours_per_day` becomes 6, missing or negative
    /// `rollover_hours` becomes 0. Non-finite values are treated as missing.
    ///
    /// An explicit `hours_per_day` of 0 (or below) is kept as-is so the
    /// allocator falls back to monthly-only accounting.
    ///
    /// # Examples
    ///
    /// ```
    /// use studioboard_types::RetainerConfig;
    ///
    /// let resolved = RetainerConfig::default().resolve();
    /// assert_eq!(resolved.hours_per_day, 6.0);
    /// assert_eq!(resolved.rollover_budget, 0.0);
    /// ```
    pub fn resolve(&self) -> ResolvedRetainer {
        let finite = |v: Option<f64>| v.filter(|x| x.is_finite());

        ResolvedRetainer {
            monthly_hours: finite(self.monthly_hours),
            rollover_budget: finite(self.rollover_hours).unwrap_or(0.0).max(0.0),
            hours_per_day: finite(self.hours_per_day).unwrap_or(DEFAULT_HOURS_PER_DAY),
        }
    }

    /// Human label for the agreed days, e.g. "3 days/week"
    pub fn agreed_days_label(&self) -> Option<String> {
        match (self.agreed_days_per_week, self.agreed_days_per_month) {
            (Some(week), Some(month)) => Some(format!(
                "{} days/week, {} days/month",
                trim_number(week),
                trim_number(month)
            )),
            (Some(week), None) => Some(format!("{} days/week", trim_number(week))),
            (None, Some(month)) => Some(format!("{} days/month", trim_number(month))),
            (None, None) => None,
        }
    }
}

fn trim_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

/// A client and its retainer terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub retainer: RetainerConfig,
}

/// A single logged block of work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub client_id: String,
    /// Day the work was logged against
    pub date: NaiveDate,
    pub hours: f64,
    #[serde(default)]
    pub task_name: String,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TimeEntry {
    /// Minimal entry, mostly useful for tests and fixtures
    pub fn new(client_id: impl Into<String>, date: NaiveDate, hours: f64) -> Self {
        Self {
            client_id: client_id.into(),
            date,
            hours,
            task_name: String::new(),
            project_name: String::new(),
            user_name: String::new(),
            notes: None,
        }
    }
}
