//! Month-level aggregates over daily splits

use chrono::NaiveDate;
use std::collections::BTreeMap;
use studioboard_types::{
    CapacityStatus, Client, DailySplit, DateRange, MonthKey, MonthSummary, ResolvedRetainer,
    RetainerReport, TimeEntry, DEFAULT_HOURS_PER_DAY,
};

use super::{allocate_with_scope, Allocation, RolloverScope};

fn days_in_month(
    daily: &BTreeMap<NaiveDate, DailySplit>,
    month: MonthKey,
) -> impl Iterator<Item = &DailySplit> {
    daily
        .range(month.first_day()..=month.last_day())
        .map(|(_, split)| split)
}

/// Everything logged in `month`
pub fn month_total_hours(daily: &BTreeMap<NaiveDate, DailySplit>, month: MonthKey) -> f64 {
    days_in_month(daily, month).map(|s| s.total_hours).sum()
}

/// Rollover drawn on the days of `month` only
pub fn month_total_rollover_hours(
    daily: &BTreeMap<NaiveDate, DailySplit>,
    month: MonthKey,
) -> f64 {
    days_in_month(daily, month)
        .map(|s| s.rollover_hours_used)
        .sum()
}

/// Monthly allowance minus hours logged. Negative values mean the month is over.
pub fn monthly_capacity_remaining(
    monthly_hours: f64,
    daily: &BTreeMap<NaiveDate, DailySplit>,
    month: MonthKey,
) -> f64 {
    monthly_hours - month_total_hours(daily, month)
}

/// Rollover budget left on `as_of`
pub fn rollover_remaining(rollover_hours: f64, allocation: &Allocation, as_of: NaiveDate) -> f64 {
    rollover_hours - allocation.rollover_drawn_from_pool(as_of)
}

/// Convert hours to retainer days for display.
///
/// A non-positive or non-finite `hours_per_day` falls back to the default of
/// 6 so the result is always finite.
///
/// # Examples
///
/// ```
/// use studioboard_core::allocation::hours_to_days;
///
/// assert_eq!(hours_to_days(9.0, 6.0), 1.5);
/// assert_eq!(hours_to_days(12.0, 0.0), 2.0);
/// ```
pub fn hours_to_days(hours: f64, hours_per_day: f64) -> f64 {
    let divisor = if hours_per_day.is_finite() && hours_per_day > 0.0 {
        hours_per_day
    } else {
        DEFAULT_HOURS_PER_DAY
    };
    hours / divisor
}

/// One summary per month in `months`; months without entries report zero totals
pub fn summarize_months(
    daily: &BTreeMap<NaiveDate, DailySplit>,
    resolved: &ResolvedRetainer,
    months: &[MonthKey],
) -> Vec<MonthSummary> {
    months
        .iter()
        .map(|&month| {
            let mut total_hours = 0.0;
            let mut rollover_hours = 0.0;
            let mut unaccounted_hours = 0.0;
            let mut days_logged = 0;

            for split in days_in_month(daily, month) {
                total_hours += split.total_hours;
                rollover_hours += split.rollover_hours_used;
                unaccounted_hours += split.unaccounted_hours();
                days_logged += 1;
            }

            let capacity_remaining = resolved.monthly_hours.map(|m| m - total_hours);

            MonthSummary {
                month,
                total_hours,
                total_days: hours_to_days(total_hours, resolved.hours_per_day),
                rollover_hours,
                rollover_days: hours_to_days(rollover_hours, resolved.hours_per_day),
                unaccounted_hours,
                days_logged,
                monthly_hours: resolved.monthly_hours,
                capacity_remaining,
                status: CapacityStatus::from_remaining(capacity_remaining),
            }
        })
        .collect()
}

/// Build a full report for `client` over `range`.
///
/// `entries` may contain other clients or dates; only the client's entries
/// inside `range` are allocated. Rollover remaining is measured on `as_of`,
/// clamped into the range.
pub fn build_report(
    client: &Client,
    entries: &[TimeEntry],
    range: DateRange,
    scope: RolloverScope,
    as_of: NaiveDate,
) -> RetainerReport {
    let resolved = client.retainer.resolve();

    let allocation = allocate_with_scope(
        resolved.daily_allocation(),
        resolved.rollover_budget,
        entries
            .iter()
            .filter(|e| e.client_id == client.id && range.contains(e.date))
            .map(|e| (e.date, e.hours)),
        scope,
    );

    let as_of = as_of.clamp(range.start, range.end);
    let rollover_remaining = rollover_remaining(resolved.rollover_budget, &allocation, as_of);
    let rollover_used = allocation.cumulative_rollover_used();
    let months = summarize_months(allocation.daily(), &resolved, &range.months());

    RetainerReport {
        client_id: client.id.clone(),
        client_name: client.name.clone(),
        period: range,
        daily: allocation.into_daily(),
        months,
        hours_per_day: resolved.hours_per_day,
        rollover_budget: resolved.rollover_budget,
        rollover_used,
        rollover_remaining,
        agreed_days: client.retainer.agreed_days_label(),
    }
}
