//! Monthly capacity forecast
//!
//! Projects where a client's month will land from the hours logged so far:
//! working days left, run-rate projection and a likelihood-to-fill level.
//! Simple linear run-rate over elapsed working days (Mon-Fri), no seasonality.

use crate::allocation::hours_to_days;
use crate::settings::ForecastThresholds;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use studioboard_types::{MonthKey, MonthSummary};

/// How likely the month is to use its allowance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FillLikelihood {
    /// Projection below the possible threshold
    Unlikely,
    /// Projection >= possible threshold
    Possible,
    /// Projection >= likely threshold
    Likely,
    /// Projection >= overbooked threshold
    Overbooked,
}

impl FillLikelihood {
    pub fn label(&self) -> &'static str {
        match self {
            FillLikelihood::Unlikely => "unlikely",
            FillLikelihood::Possible => "possible",
            FillLikelihood::Likely => "likely",
            FillLikelihood::Overbooked => "overbooked",
        }
    }
}

/// Forecast for a single month
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityForecast {
    pub month: MonthKey,
    pub as_of: NaiveDate,
    pub working_days_elapsed: u32,
    pub working_days_remaining: u32,
    /// Hours logged per elapsed working day
    pub daily_run_rate: f64,
    pub projected_hours: f64,
    /// Projected hours as a percentage of the allowance
    pub projected_utilisation_pct: f64,
    /// Allowance minus hours logged (negative when over)
    pub capacity_remaining_hours: f64,
    pub capacity_remaining_days: f64,
    /// Hours per remaining working day needed to fill the month
    pub hours_needed_per_day: Option<f64>,
    pub likelihood: FillLikelihood,
    /// Reason if unavailable
    pub unavailable_reason: Option<String>,
}

impl CapacityForecast {
    /// Create unavailable forecast with reason
    pub fn unavailable(month: MonthKey, as_of: NaiveDate, reason: &str) -> Self {
        Self {
            month,
            as_of,
            working_days_elapsed: 0,
            working_days_remaining: 0,
            daily_run_rate: 0.0,
            projected_hours: 0.0,
            projected_utilisation_pct: 0.0,
            capacity_remaining_hours: 0.0,
            capacity_remaining_days: 0.0,
            hours_needed_per_day: None,
            likelihood: FillLikelihood::Unlikely,
            unavailable_reason: Some(reason.to_string()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.unavailable_reason.is_none()
    }
}

/// Weekdays (Mon-Fri) between `from` and `to`, inclusive. Zero when `from > to`.
pub fn count_working_days(from: NaiveDate, to: NaiveDate) -> u32 {
    if from > to {
        return 0;
    }
    from.iter_days()
        .take_while(|d| *d <= to)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .count() as u32
}

/// Forecast `summary`'s month as seen on `as_of`
///
/// 1. Split the month's working days into elapsed (up to `as_of`) and remaining
/// 2. Run-rate = hours logged / elapsed working days
/// 3. Projection = logged + run-rate * remaining working days
/// 4. Likelihood from projected utilisation against `thresholds`
pub fn forecast_month(
    summary: &MonthSummary,
    hours_per_day: f64,
    as_of: NaiveDate,
    thresholds: &ForecastThresholds,
) -> CapacityForecast {
    let month = summary.month;

    let monthly_hours = match summary.monthly_hours {
        Some(hours) if hours > 0.0 => hours,
        _ => {
            return CapacityForecast::unavailable(month, as_of, "No monthly allowance configured")
        }
    };

    let first = month.first_day();
    let last = month.last_day();

    let working_days_elapsed = count_working_days(first, as_of.min(last));
    let working_days_remaining = match as_of.succ_opt() {
        Some(next) => count_working_days(next.max(first), last),
        None => 0,
    };

    let daily_run_rate = if working_days_elapsed > 0 {
        summary.total_hours / working_days_elapsed as f64
    } else {
        0.0
    };

    let projected_hours = summary.total_hours + daily_run_rate * working_days_remaining as f64;
    let projected_utilisation_pct = projected_hours / monthly_hours * 100.0;

    let capacity_remaining_hours = monthly_hours - summary.total_hours;
    let hours_needed_per_day = (working_days_remaining > 0 && capacity_remaining_hours > 0.0)
        .then(|| capacity_remaining_hours / working_days_remaining as f64);

    CapacityForecast {
        month,
        as_of,
        working_days_elapsed,
        working_days_remaining,
        daily_run_rate,
        projected_hours,
        projected_utilisation_pct,
        capacity_remaining_hours,
        capacity_remaining_days: hours_to_days(capacity_remaining_hours, hours_per_day),
        hours_needed_per_day,
        likelihood: determine_likelihood(projected_utilisation_pct, thresholds),
        unavailable_reason: None,
    }
}

/// Determine likelihood level from projected utilisation percentage
fn determine_likelihood(utilisation_pct: f64, thresholds: &ForecastThresholds) -> FillLikelihood {
    if utilisation_pct >= thresholds.overbooked_threshold {
        FillLikelihood::Overbooked
    } else if utilisation_pct >= thresholds.likely_threshold {
        FillLikelihood::Likely
    } else if utilisation_pct >= thresholds.possible_threshold {
        FillLikelihood::Possible
    } else {
        FillLikelihood::Unlikely
    }
}
