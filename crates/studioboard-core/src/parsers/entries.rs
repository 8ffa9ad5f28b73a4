//! Time entry export parser with validation and retry on parse failure

use crate::error::{CoreError, LoadError, LoadReport};
use std::path::Path;
use std::time::Duration;
use studioboard_types::TimeEntry;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::read_json;

/// Check a single entry before it reaches the allocator.
///
/// Hours must be finite and strictly positive, and the entry must name a client.
pub fn validate_entry(index: usize, entry: &TimeEntry) -> Result<(), CoreError> {
    let reason = if entry.client_id.trim().is_empty() {
        Some("missing client id".to_string())
    } else if !entry.hours.is_finite() {
        Some(format!("hours must be a number, got {}", entry.hours))
    } else if entry.hours <= 0.0 {
        Some(format!("hours must be positive, got {}", entry.hours))
    } else {
        None
    };

    match reason {
        Some(reason) => Err(CoreError::InvalidEntry {
            index,
            client_id: entry.client_id.clone(),
            date: entry.date,
            reason,
        }),
        None => Ok(()),
    }
}

/// Validate every entry, failing on the first bad one
pub fn validate_entries(entries: &[TimeEntry]) -> Result<(), CoreError> {
    entries
        .iter()
        .enumerate()
        .try_for_each(|(index, entry)| validate_entry(index, entry))
}

/// Parser for `time-entries.json` (a JSON array of entries)
pub struct EntryParser {
    /// Maximum retry attempts
    max_retries: u32,
    /// Delay between retries
    retry_delay: Duration,
}

impl Default for EntryParser {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_delay: Duration::from_millis(100),
        }
    }
}

impl EntryParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retries(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    /// Parse and strictly validate the export.
    ///
    /// Parse failures are retried since the export may be mid-write.
    /// Validation failures are returned immediately.
    pub async fn parse(&self, path: &Path) -> Result<Vec<TimeEntry>, CoreError> {
        let entries = self.parse_unvalidated(path).await?;
        validate_entries(&entries)?;
        Ok(entries)
    }

    async fn parse_unvalidated(&self, path: &Path) -> Result<Vec<TimeEntry>, CoreError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                debug!(attempt, "Retrying time entry parse after delay");
                sleep(self.retry_delay).await;
            }

            match read_json::<Vec<TimeEntry>>(path).await {
                Ok(entries) => return Ok(entries),
                Err(e @ CoreError::FileNotFound { .. }) => return Err(e),
                Err(e) => {
                    warn!(attempt, error = %e, "Time entry parse attempt failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::FileNotFound {
            path: path.to_path_buf(),
        }))
    }

    /// Parse with graceful degradation.
    ///
    /// Invalid rows are skipped and recorded as warnings; a missing or
    /// unreadable file yields `None` plus an entry in the report.
    pub async fn parse_graceful(
        &self,
        path: &Path,
        report: &mut LoadReport,
    ) -> Option<Vec<TimeEntry>> {
        let entries = match self.parse_unvalidated(path).await {
            Ok(entries) => entries,
            Err(e @ CoreError::FileNotFound { .. }) => {
                report.add_warning("entries", e.to_string());
                return None;
            }
            Err(e) => {
                report.add_error(LoadError::from_core_error("entries", &e));
                return None;
            }
        };

        let mut valid = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match validate_entry(index, &entry) {
                Ok(()) => valid.push(entry),
                Err(e) => {
                    warn!(index, error = %e, "Skipping invalid time entry");
                    report.add_warning("entries", e.to_string());
                    report.entries_skipped += 1;
                }
            }
        }

        report.entries_loaded += valid.len();
        Some(valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_validate_entry() {
        let ok = TimeEntry::new("acme", date(2025, 3, 3), 2.5);
        assert!(validate_entry(0, &ok).is_ok());

        let zero = TimeEntry::new("acme", date(2025, 3, 3), 0.0);
        assert!(matches!(
            validate_entry(1, &zero),
            Err(CoreError::InvalidEntry { index: 1, .. })
        ));

        let negative = TimeEntry::new("acme", date(2025, 3, 3), -1.0);
        assert!(validate_entry(0, &negative).is_err());

        let nan = TimeEntry::new("acme", date(2025, 3, 3), f64::NAN);
        assert!(validate_entry(0, &nan).is_err());

        let anonymous = TimeEntry::new("  ", date(2025, 3, 3), 1.0);
        assert!(validate_entry(0, &anonymous).is_err());
    }

    #[tokio::test]
    async fn test_parse_valid_entries() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"[
                {{"clientId": "acme", "date": "2025-03-03", "hours": 4, "taskName": "Design"}},
                {{"clientId": "acme", "date": "2025-03-03", "hours": 2.5, "notes": "call"}}
            ]"#
        )
        .unwrap();

        let entries = EntryParser::new().parse(file.path()).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].task_name, "Design");
        assert_eq!(entries[1].hours, 2.5);
        assert_eq!(entries[1].notes.as_deref(), Some("call"));
    }

    #[tokio::test]
    async fn test_parse_rejects_invalid_hours() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"[{{"clientId": "acme", "date": "2025-03-03", "hours": -3}}]"#
        )
        .unwrap();

        let result = EntryParser::new().parse(file.path()).await;
        assert!(matches!(result, Err(CoreError::InvalidEntry { .. })));
    }

    #[tokio::test]
    async fn test_parse_missing_file() {
        let result = EntryParser::new()
            .parse(Path::new("/nonexistent/time-entries.json"))
            .await;
        assert!(matches!(result, Err(CoreError::FileNotFound { .. })));
    }

    #[tokio::test]
    async fn test_parse_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let parser = EntryParser::new().with_retries(1, Duration::from_millis(10));
        let result = parser.parse(file.path()).await;
        assert!(matches!(result, Err(CoreError::JsonParse { .. })));
    }

    #[tokio::test]
    async fn test_parse_graceful_skips_bad_rows() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"[
                {{"clientId": "acme", "date": "2025-03-03", "hours": 4}},
                {{"clientId": "acme", "date": "2025-03-04", "hours": 0}},
                {{"clientId": "acme", "date": "2025-03-05", "hours": 3}}
            ]"#
        )
        .unwrap();

        let mut report = LoadReport::new();
        let entries = EntryParser::new()
            .parse_graceful(file.path(), &mut report)
            .await
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(report.entries_loaded, 2);
        assert_eq!(report.entries_skipped, 1);
        assert_eq!(report.warnings().count(), 1);
    }
}
