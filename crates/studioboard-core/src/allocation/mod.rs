//! Retainer capacity allocation
//!
//! Splits each day's logged hours between the client's monthly allocation and
//! a capped rollover pool. The whole computation is a single forward fold over
//! the dates in ascending order; the running rollover total is fold state, so
//! repeated calls on the same input always give the same result.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use studioboard_types::{DailySplit, MonthKey};
use tracing::debug;

pub mod summary;


pub use summary::{
    build_report, hours_to_days, month_total_hours, month_total_rollover_hours,
    monthly_capacity_remaining, rollover_remaining, summarize_months,
};

/// Window over which the rollover budget is shared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RolloverScope {
    /// One pool for the whole queried range (never resets)
    #[default]
    Period,
    /// Budget resets on the first logged day of each calendar month
    Month,
}

impl RolloverScope {
    pub fn label(&self) -> &'static str {
        match self {
            RolloverScope::Period => "period",
            RolloverScope::Month => "month",
        }
    }
}

impl std::str::FromStr for RolloverScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "period" => Ok(RolloverScope::Period),
            "month" => Ok(RolloverScope::Month),
            other => Err(format!(
                "Unknown rollover scope '{}' (expected: period, month)",
                other
            )),
        }
    }
}

/// Result of one allocation run
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    daily: BTreeMap<NaiveDate, DailySplit>,
    cumulative_rollover_used: f64,
    scope: RolloverScope,
}

impl Allocation {
    /// Per-day splits in chronological order
    pub fn daily(&self) -> &BTreeMap<NaiveDate, DailySplit> {
        &self.daily
    }

    pub fn into_daily(self) -> BTreeMap<NaiveDate, DailySplit> {
        self.daily
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DailySplit> {
        self.daily.get(&date)
    }

    /// Total rollover drawn across every allocated day
    pub fn cumulative_rollover_used(&self) -> f64 {
        self.cumulative_rollover_used
    }

    pub fn scope(&self) -> RolloverScope {
        self.scope
    }

    /// Rollover drawn on days up to and including `date`
    pub fn rollover_used_through(&self, date: NaiveDate) -> f64 {
        self.daily
            .range(..=date)
            .map(|(_, split)| split.rollover_hours_used)
            .sum()
    }

    /// Rollover drawn against the pool that is live on `date`
    ///
    /// For [`RolloverScope::Period`] this is everything up to `date`; for
    /// [`RolloverScope::Month`] only the days of `date`'s month count.
    pub fn rollover_drawn_from_pool(&self, date: NaiveDate) -> f64 {
        match self.scope {
            RolloverScope::Period => self.rollover_used_through(date),
            RolloverScope::Month => {
                let first = MonthKey::of(date).first_day();
                self.daily
                    .range(first..=date)
                    .map(|(_, split)| split.rollover_hours_used)
                    .sum()
            }
        }
    }

    pub fn total_hours(&self) -> f64 {
        self.daily.values().map(|s| s.total_hours).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.daily.is_empty()
    }
}

/// Sum logged hours per date.
///
/// Several entries on the same day (different tasks or people) become one
/// `day_hours` figure before any cap is applied.
pub fn group_by_date<I>(entries: I) -> BTreeMap<NaiveDate, f64>
where
    I: IntoIterator<Item = (NaiveDate, f64)>,
{
    entries
        .into_iter()
        .fold(BTreeMap::new(), |mut days, (date, hours)| {
            *days.entry(date).or_insert(0.0) += hours;
            days
        })
}

/// Split a single day's hours.
///
/// `rollover_available` is what is left of the rollover budget before this
/// day. A non-positive `daily_allocation` charges the whole day to the
/// monthly pool with no rollover accounting. Hours beyond the cap that the
/// rollover pool cannot cover are left unaccounted.
pub fn split_day(day_hours: f64, daily_allocation: f64, rollover_available: f64) -> DailySplit {
    if daily_allocation <= 0.0 {
        return DailySplit {
            monthly_hours_used: day_hours,
            rollover_hours_used: 0.0,
            total_hours: day_hours,
        };
    }

    let monthly_hours_used = day_hours.min(daily_allocation);
    let excess = (day_hours - daily_allocation).max(0.0);
    let rollover_hours_used = excess.min(rollover_available.max(0.0));

    DailySplit {
        monthly_hours_used,
        rollover_hours_used,
        total_hours: day_hours,
    }
}

/// Allocate with a single rollover pool for the whole range
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use studioboard_core::allocation::allocate;
///
/// let day = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
/// let allocation = allocate(6.0, 10.0, [(day, 8.0)]);
/// let split = allocation.get(day).unwrap();
///
/// assert_eq!(split.monthly_hours_used, 6.0);
/// assert_eq!(split.rollover_hours_used, 2.0);
/// ```
pub fn allocate<I>(daily_allocation: f64, rollover_budget: f64, entries: I) -> Allocation
where
    I: IntoIterator<Item = (NaiveDate, f64)>,
{
    allocate_with_scope(daily_allocation, rollover_budget, entries, RolloverScope::Period)
}

/// Running state threaded through the allocation fold
#[derive(Default)]
struct FoldState {
    daily: BTreeMap<NaiveDate, DailySplit>,
    /// Month whose pool is live (only tracked for `RolloverScope::Month`)
    window: Option<MonthKey>,
    window_used: f64,
    total_used: f64,
}

/// Allocate with an explicit rollover window
pub fn allocate_with_scope<I>(
    daily_allocation: f64,
    rollover_budget: f64,
    entries: I,
    scope: RolloverScope,
) -> Allocation
where
    I: IntoIterator<Item = (NaiveDate, f64)>,
{
    let budget = if rollover_budget.is_finite() {
        rollover_budget.max(0.0)
    } else {
        0.0
    };

    let state = group_by_date(entries)
        .into_iter()
        .fold(FoldState::default(), |mut state, (date, day_hours)| {
            if scope == RolloverScope::Month {
                let month = MonthKey::of(date);
                if state.window != Some(month) {
                    state.window = Some(month);
                    state.window_used = 0.0;
                }
            }

            let split = split_day(day_hours, daily_allocation, budget - state.window_used);
            state.window_used += split.rollover_hours_used;
            state.total_used += split.rollover_hours_used;
            state.daily.insert(date, split);
            state
        });

    debug!(
        days = state.daily.len(),
        daily_allocation,
        rollover_budget = budget,
        rollover_used = state.total_used,
        scope = scope.label(),
        "Allocation computed"
    );

    Allocation {
        daily: state.daily,
        cumulative_rollover_used: state.total_used,
        scope,
    }
}
