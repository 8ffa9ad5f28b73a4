//! Data store with DashMap + parking_lot::RwLock
//!
//! Holds the exported clients and time entries in memory. Every report is
//! recomputed from these on demand by the pure allocator, nothing derived is cached.

use crate::allocation::{build_report, RolloverScope};
use crate::error::{CoreError, DegradedState, LoadError, LoadReport};
use crate::forecast::{forecast_month, CapacityForecast};
use crate::parsers::{ClientParser, EntryParser};
use crate::settings::ForecastThresholds;
use chrono::NaiveDate;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use studioboard_types::{Client, DateRange, MonthKey, RetainerReport, TimeEntry};
use tracing::{debug, info, warn};

/// File holding the client list inside the data directory
pub const CLIENTS_FILE: &str = "clients.json";
/// File holding the time entry export inside the data directory
pub const ENTRIES_FILE: &str = "time-entries.json";

/// Central data store for studioboard
///
/// Thread-safe: reports for different clients can be computed concurrently
/// from a shared `Arc<DataStore>`.
pub struct DataStore {
    /// Directory holding the exported JSON files
    data_dir: PathBuf,

    /// Rollover window applied to every report
    scope: RolloverScope,

    /// Clients by id
    clients: DashMap<String, Arc<Client>>,

    /// Time entries grouped by client id
    entries: RwLock<HashMap<String, Vec<TimeEntry>>>,

    /// Current degraded state
    degraded_state: RwLock<DegradedState>,
}

impl DataStore {
    pub fn new(data_dir: PathBuf, scope: RolloverScope) -> Self {
        Self {
            data_dir,
            scope,
            clients: DashMap::new(),
            entries: RwLock::new(HashMap::new()),
            degraded_state: RwLock::new(DegradedState::Healthy),
        }
    }

    /// Create with the default rollover scope
    pub fn with_defaults(data_dir: PathBuf) -> Self {
        Self::new(data_dir, RolloverScope::default())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn scope(&self) -> RolloverScope {
        self.scope
    }

    pub fn degraded_state(&self) -> DegradedState {
        self.degraded_state.read().clone()
    }

    /// Load clients and time entries with LoadReport for graceful degradation
    pub async fn initial_load(&self) -> LoadReport {
        let mut report = LoadReport::new();

        info!(data_dir = %self.data_dir.display(), "Starting initial data load");

        if !tokio::fs::try_exists(&self.data_dir).await.unwrap_or(false) {
            let err = CoreError::DirectoryNotFound {
                path: self.data_dir.clone(),
            };
            report.add_error(LoadError::from_core_error("data-dir", &err).into_fatal());
            self.update_degraded_state(
                &report,
                vec!["clients".to_string(), "entries".to_string()],
            );
            return report;
        }

        let mut missing = Vec::new();

        let clients = ClientParser::new()
            .parse_graceful(&self.data_dir.join(CLIENTS_FILE), &mut report)
            .await;
        self.clients.clear();
        match clients {
            Some(clients) => {
                for client in clients {
                    self.clients.insert(client.id.clone(), Arc::new(client));
                }
            }
            None => missing.push("clients".to_string()),
        }

        let entries = EntryParser::new()
            .parse_graceful(&self.data_dir.join(ENTRIES_FILE), &mut report)
            .await;
        if entries.is_none() {
            missing.push("entries".to_string());
        }
        self.index_entries(entries.unwrap_or_default(), &mut report);

        self.update_degraded_state(&report, missing);

        info!(
            clients_loaded = report.clients_loaded,
            entries_loaded = report.entries_loaded,
            entries_skipped = report.entries_skipped,
            errors = report.errors.len(),
            "Initial load complete"
        );

        report
    }

    /// Group entries by client, dropping entries for unknown clients
    fn index_entries(&self, entries: Vec<TimeEntry>, report: &mut LoadReport) {
        let mut by_client: HashMap<String, Vec<TimeEntry>> = HashMap::new();
        let mut orphaned = 0usize;

        for entry in entries {
            if self.clients.contains_key(&entry.client_id) {
                by_client
                    .entry(entry.client_id.clone())
                    .or_default()
                    .push(entry);
            } else {
                orphaned += 1;
                debug!(client_id = %entry.client_id, date = %entry.date, "Entry for unknown client");
            }
        }

        if orphaned > 0 {
            warn!(orphaned, "Dropped time entries for unknown clients");
            report.add_warning(
                "entries",
                format!("{} entries reference unknown clients", orphaned),
            );
            report.entries_loaded -= orphaned.min(report.entries_loaded);
            report.entries_skipped += orphaned;
        }

        *self.entries.write() = by_client;
    }

    /// `missing` lists the sources whose files could not be loaded
    fn update_degraded_state(&self, report: &LoadReport, missing: Vec<String>) {
        let state = if report.has_errors() || !missing.is_empty() {
            DegradedState::PartialData {
                missing,
                reason: format!("{} load issue(s)", report.errors.len()),
            }
        } else {
            DegradedState::Healthy
        };

        *self.degraded_state.write() = state;
    }

    /// All clients sorted by name
    pub fn clients(&self) -> Vec<Arc<Client>> {
        let mut clients: Vec<_> = self
            .clients
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        clients.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        clients
    }

    pub fn client(&self, client_id: &str) -> Option<Arc<Client>> {
        self.clients.get(client_id).map(|c| Arc::clone(c.value()))
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.read().values().map(Vec::len).sum()
    }

    /// Entries for one client, optionally limited to `range`, sorted by date
    pub fn entries_for(&self, client_id: &str, range: Option<DateRange>) -> Vec<TimeEntry> {
        let guard = self.entries.read();
        let mut entries: Vec<TimeEntry> = guard
            .get(client_id)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| range.is_none_or(|r| r.contains(e.date)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        entries.sort_by_key(|e| e.date);
        entries
    }

    /// Range spanning the client's first to last logged day
    pub fn logged_range(&self, client_id: &str) -> Option<DateRange> {
        let guard = self.entries.read();
        let entries = guard.get(client_id)?;
        let first = entries.iter().map(|e| e.date).min()?;
        let last = entries.iter().map(|e| e.date).max()?;
        DateRange::new(first, last)
    }

    fn require_client(&self, client_id: &str) -> Result<Arc<Client>, CoreError> {
        self.client(client_id)
            .ok_or_else(|| CoreError::ClientNotFound {
                client_id: client_id.to_string(),
            })
    }

    /// Allocation report for one client over `range`
    pub fn report(
        &self,
        client_id: &str,
        range: DateRange,
        as_of: NaiveDate,
    ) -> Result<RetainerReport, CoreError> {
        let client = self.require_client(client_id)?;
        let entries = self.entries_for(client_id, Some(range));

        debug!(client_id, entries = entries.len(), start = %range.start, end = %range.end, "Building report");

        Ok(build_report(&client, &entries, range, self.scope, as_of))
    }

    /// Capacity forecast for one client and month
    pub fn forecast(
        &self,
        client_id: &str,
        month: MonthKey,
        as_of: NaiveDate,
        thresholds: &ForecastThresholds,
    ) -> Result<CapacityForecast, CoreError> {
        let range = month.range();
        let report = self.report(client_id, range, as_of)?;
        let summary = report
            .month(month)
            .ok_or_else(|| CoreError::InvalidConfig {
                message: format!("Month {} missing from report", month),
            })?;

        Ok(forecast_month(summary, report.hours_per_day, as_of, thresholds))
    }
}
