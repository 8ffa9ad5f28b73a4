//! Property tests for the capacity allocator
//!
//! Run with:
//! ```bash
//! cargo test --test allocation_properties
//! ```

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use studioboard_core::allocation::{allocate, allocate_with_scope, group_by_date, RolloverScope};

const EPSILON: f64 = 1e-9;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

/// Entries spread over ~4 months, quarter-hour granularity, several per day possible
fn arb_entries() -> impl Strategy<Value = Vec<(NaiveDate, f64)>> {
    prop::collection::vec((0i64..120, 1u32..64), 0..80).prop_map(|raw| {
        raw.into_iter()
            .map(|(offset, quarters)| (base_date() + Duration::days(offset), quarters as f64 * 0.25))
            .collect()
    })
}

fn arb_cap() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), Just(-1.0), (1u32..40).prop_map(|q| q as f64 * 0.25)]
}

fn arb_budget() -> impl Strategy<Value = f64> {
    (0u32..200).prop_map(|q| q as f64 * 0.25)
}

proptest! {
    #[test]
    fn split_never_exceeds_day_total(entries in arb_entries(), cap in arb_cap(), budget in arb_budget()) {
        let allocation = allocate(cap, budget, entries.clone());
        let days = group_by_date(entries);

        prop_assert_eq!(allocation.daily().len(), days.len());
        for (date, split) in allocation.daily() {
            prop_assert!(split.monthly_hours_used >= 0.0);
            prop_assert!(split.rollover_hours_used >= 0.0);
            prop_assert!(split.monthly_hours_used + split.rollover_hours_used <= split.total_hours + EPSILON);
            prop_assert!((split.total_hours - days[date]).abs() < EPSILON);
        }
    }

    #[test]
    fn cumulative_rollover_is_monotonic_and_capped(entries in arb_entries(), cap in arb_cap(), budget in arb_budget()) {
        let allocation = allocate(cap, budget, entries);

        let mut running = 0.0;
        for split in allocation.daily().values() {
            let next = running + split.rollover_hours_used;
            prop_assert!(next >= running);
            prop_assert!(next <= budget + EPSILON);
            running = next;
        }
        prop_assert!((allocation.cumulative_rollover_used() - running).abs() < EPSILON);
    }

    #[test]
    fn non_positive_cap_is_monthly_only(entries in arb_entries(), budget in arb_budget(), cap in prop_oneof![Just(0.0), Just(-6.0)]) {
        let allocation = allocate(cap, budget, entries);

        for split in allocation.daily().values() {
            prop_assert_eq!(split.rollover_hours_used, 0.0);
            prop_assert_eq!(split.monthly_hours_used, split.total_hours);
        }
    }

    #[test]
    fn fully_accounted_while_rollover_remains(entries in arb_entries(), cap in 1u32..40, budget in arb_budget()) {
        let cap = cap as f64 * 0.25;
        let allocation = allocate(cap, budget, entries);

        let mut used = 0.0;
        for split in allocation.daily().values() {
            if split.unaccounted_hours() > EPSILON {
                // Both pools exhausted: rollover drained to the budget
                prop_assert!((used + split.rollover_hours_used - budget).abs() < EPSILON);
            }
            used += split.rollover_hours_used;
        }
    }

    #[test]
    fn allocation_is_deterministic(entries in arb_entries(), cap in arb_cap(), budget in arb_budget()) {
        let mut shuffled = entries.clone();
        shuffled.reverse();

        let first = allocate(cap, budget, entries);
        let second = allocate(cap, budget, shuffled);
        prop_assert_eq!(first.daily().keys().collect::<Vec<_>>(), second.daily().keys().collect::<Vec<_>>());
        for (a, b) in first.daily().values().zip(second.daily().values()) {
            prop_assert!((a.rollover_hours_used - b.rollover_hours_used).abs() < EPSILON);
            prop_assert!((a.total_hours - b.total_hours).abs() < EPSILON);
        }
    }

    #[test]
    fn month_scope_never_draws_less_than_period(entries in arb_entries(), cap in 1u32..40, budget in arb_budget()) {
        let cap = cap as f64 * 0.25;
        let period = allocate_with_scope(cap, budget, entries.clone(), RolloverScope::Period);
        let month = allocate_with_scope(cap, budget, entries, RolloverScope::Month);

        prop_assert!(month.cumulative_rollover_used() + EPSILON >= period.cumulative_rollover_used());
    }
}
