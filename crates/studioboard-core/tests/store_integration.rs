//! Integration tests for loading a data directory and building reports

use chrono::NaiveDate;
use std::sync::Arc;
use studioboard_core::store::{CLIENTS_FILE, ENTRIES_FILE};
use studioboard_core::{
    CoreError, DataStore, DegradedState, FillLikelihood, ForecastThresholds, RolloverScope,
};
use studioboard_types::{DateRange, MonthKey};
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

const CLIENTS: &str = r#"[
    {
        "id": "acme",
        "name": "Acme Ltd",
        "retainer": { "monthlyHours": 40, "rolloverHours": 6, "hoursPerDay": 6, "agreedDaysPerWeek": 2 }
    },
    {
        "id": "globex",
        "name": "Globex",
        "retainer": { "monthlyHours": 20, "hoursPerDay": 0 }
    }
]"#;

const ENTRIES: &str = r#"[
    { "clientId": "acme", "date": "2025-03-03", "hours": 5, "taskName": "Design", "userName": "sam" },
    { "clientId": "acme", "date": "2025-03-03", "hours": 3, "taskName": "Review", "userName": "alex" },
    { "clientId": "acme", "date": "2025-03-31", "hours": 9 },
    { "clientId": "acme", "date": "2025-04-01", "hours": 8 },
    { "clientId": "acme", "date": "2025-04-02", "hours": -1 },
    { "clientId": "globex", "date": "2025-03-05", "hours": 11 },
    { "clientId": "initech", "date": "2025-03-05", "hours": 2 }
]"#;

fn write_data_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(CLIENTS_FILE), CLIENTS).unwrap();
    std::fs::write(dir.path().join(ENTRIES_FILE), ENTRIES).unwrap();
    dir
}

#[tokio::test]
async fn test_initial_load_skips_bad_and_orphaned_entries() {
    let dir = write_data_dir();
    let store = DataStore::with_defaults(dir.path().to_path_buf());

    let report = store.initial_load().await;

    assert!(!report.has_fatal_errors());
    assert_eq!(report.clients_loaded, 2);
    assert_eq!(report.entries_loaded, 5);
    assert_eq!(report.entries_skipped, 2); // negative hours + unknown client
    assert_eq!(store.client_count(), 2);
    assert_eq!(store.entry_count(), 5);
    assert!(store.degraded_state().is_degraded());

    let names: Vec<String> = store.clients().iter().map(|c| c.name.clone()).collect();
    assert_eq!(names, vec!["Acme Ltd", "Globex"]);
}

#[tokio::test]
async fn test_missing_data_dir_is_fatal() {
    let store = DataStore::with_defaults("/nonexistent/studioboard-data".into());
    let report = store.initial_load().await;

    assert!(report.has_fatal_errors());
    assert_eq!(store.client_count(), 0);
}

#[tokio::test]
async fn test_empty_entries_export_is_healthy() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(CLIENTS_FILE), CLIENTS).unwrap();
    std::fs::write(dir.path().join(ENTRIES_FILE), "[]").unwrap();

    let store = DataStore::with_defaults(dir.path().to_path_buf());
    let report = store.initial_load().await;

    assert!(!report.has_errors());
    assert_eq!(store.entry_count(), 0);
    assert_eq!(store.degraded_state(), DegradedState::Healthy);
}

#[tokio::test]
async fn test_missing_entries_file_marks_entries_missing() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(CLIENTS_FILE), CLIENTS).unwrap();

    let store = DataStore::with_defaults(dir.path().to_path_buf());
    let report = store.initial_load().await;

    assert!(!report.has_fatal_errors());
    assert_eq!(store.client_count(), 2);
    match store.degraded_state() {
        DegradedState::PartialData { missing, .. } => assert_eq!(missing, vec!["entries"]),
        DegradedState::Healthy => panic!("Expected PartialData"),
    }
}

#[tokio::test]
async fn test_report_period_scope() {
    let dir = write_data_dir();
    let store = DataStore::with_defaults(dir.path().to_path_buf());
    store.initial_load().await;

    let range = DateRange::new(date(2025, 3, 1), date(2025, 4, 30)).unwrap();
    let report = store.report("acme", range, date(2025, 4, 30)).unwrap();

    // 2025-03-03: 5h + 3h summed → 6 monthly + 2 rollover
    let day = report.daily[&date(2025, 3, 3)];
    assert_eq!(day.total_hours, 8.0);
    assert_eq!(day.monthly_hours_used, 6.0);
    assert_eq!(day.rollover_hours_used, 2.0);

    // 2025-03-31: 9h → 3h excess, pool has 4 left
    assert_eq!(report.daily[&date(2025, 3, 31)].rollover_hours_used, 3.0);

    // 2025-04-01: 8h → 2h excess, only 1h left in the shared pool
    let april = report.daily[&date(2025, 4, 1)];
    assert_eq!(april.rollover_hours_used, 1.0);
    assert_eq!(april.unaccounted_hours(), 1.0);

    assert_eq!(report.rollover_used, 6.0);
    assert_eq!(report.rollover_remaining, 0.0);

    let march = report.month(MonthKey::new(2025, 3).unwrap()).unwrap();
    assert_eq!(march.total_hours, 17.0);
    assert_eq!(march.rollover_hours, 5.0);
    assert_eq!(march.capacity_remaining, Some(23.0));
    assert_eq!(report.agreed_days.as_deref(), Some("2 days/week"));
}

#[tokio::test]
async fn test_report_month_scope() {
    let dir = write_data_dir();
    let store = DataStore::new(dir.path().to_path_buf(), RolloverScope::Month);
    store.initial_load().await;

    let range = DateRange::new(date(2025, 3, 1), date(2025, 4, 30)).unwrap();
    let report = store.report("acme", range, date(2025, 4, 30)).unwrap();

    // Fresh 6h pool in April covers the full 2h excess
    assert_eq!(report.daily[&date(2025, 4, 1)].rollover_hours_used, 2.0);
    assert_eq!(report.rollover_remaining, 4.0);
}

#[tokio::test]
async fn test_zero_hours_per_day_is_monthly_only() {
    let dir = write_data_dir();
    let store = DataStore::with_defaults(dir.path().to_path_buf());
    store.initial_load().await;

    let range = MonthKey::new(2025, 3).unwrap().range();
    let report = store.report("globex", range, date(2025, 3, 31)).unwrap();

    let day = report.daily[&date(2025, 3, 5)];
    assert_eq!(day.monthly_hours_used, 11.0);
    assert_eq!(day.rollover_hours_used, 0.0);
    // Display conversion falls back to 6h days
    assert_eq!(report.months[0].total_days, 11.0 / 6.0);
}

#[tokio::test]
async fn test_unknown_client() {
    let dir = write_data_dir();
    let store = DataStore::with_defaults(dir.path().to_path_buf());
    store.initial_load().await;

    let range = MonthKey::new(2025, 3).unwrap().range();
    let result = store.report("initech", range, date(2025, 3, 31));
    assert!(matches!(result, Err(CoreError::ClientNotFound { .. })));
}

#[tokio::test]
async fn test_forecast_from_store() {
    let dir = write_data_dir();
    let store = DataStore::with_defaults(dir.path().to_path_buf());
    store.initial_load().await;

    let forecast = store
        .forecast(
            "acme",
            MonthKey::new(2025, 3).unwrap(),
            date(2025, 3, 31),
            &ForecastThresholds::default(),
        )
        .unwrap();

    assert!(forecast.is_available());
    assert_eq!(forecast.working_days_remaining, 0);
    assert_eq!(forecast.capacity_remaining_hours, 23.0);
    assert_eq!(forecast.likelihood, FillLikelihood::Unlikely);
}

#[tokio::test]
async fn test_concurrent_reports_are_identical() {
    let dir = write_data_dir();
    let store = Arc::new(DataStore::with_defaults(dir.path().to_path_buf()));
    store.initial_load().await;

    let range = DateRange::new(date(2025, 3, 1), date(2025, 4, 30)).unwrap();
    let expected = store.report("acme", range, date(2025, 4, 30)).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.report("acme", range, date(2025, 4, 30)).unwrap() })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), expected);
    }
}
