//! Error types for studioboard-core
//!
//! The allocator itself never fails; these errors cover loading, validation
//! and lookups around it. `LoadReport` lets the store keep going with partial
//! data instead of failing on the first bad row.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for studioboard operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // IO Errors
    // ===================
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    // ===================
    // Parse Errors
    // ===================
    #[error("Failed to parse JSON in {path}: {message}")]
    JsonParse {
        path: PathBuf,
        message: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse TOML in {path}: {message}")]
    TomlParse {
        path: PathBuf,
        message: String,
        #[source]
        source: toml::de::Error,
    },

    // ===================
    // Validation Errors
    // ===================
    #[error("Invalid time entry #{index} ({client_id} on {date}): {reason}")]
    InvalidEntry {
        index: usize,
        client_id: String,
        date: chrono::NaiveDate,
        reason: String,
    },

    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    // ===================
    // Store Errors
    // ===================
    #[error("Client not found: {client_id}")]
    ClientNotFound { client_id: String },

    // ===================
    // Config Errors
    // ===================
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Severity level for errors during load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Non-critical, can continue with degraded functionality
    Warning,
    /// Significant but not fatal
    Error,
    /// Cannot continue
    Fatal,
}

/// Individual error entry in load report
#[derive(Debug, Clone)]
pub struct LoadError {
    pub source: String,
    pub message: String,
    pub severity: ErrorSeverity,
    /// Actionable suggestion for user (optional)
    pub suggestion: Option<String>,
}

impl LoadError {
    pub fn warning(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
            severity: ErrorSeverity::Warning,
            suggestion: None,
        }
    }

    /// Escalate to fatal, keeping message and suggestion
    pub fn into_fatal(mut self) -> Self {
        self.severity = ErrorSeverity::Fatal;
        self
    }

    /// Create user-friendly error from CoreError with context-aware suggestions
    pub fn from_core_error(source: impl Into<String>, error: &CoreError) -> Self {
        let source = source.into();
        let (message, suggestion) = match error {
            CoreError::FileNotFound { path } => (
                format!("File not found: {}", path.display()),
                Some(format!("Export it from the dashboard into {}", path.display())),
            ),
            CoreError::FileRead { path, .. } => (
                format!("Cannot read file: {}", path.display()),
                Some(format!("Check permissions: chmod +r {}", path.display())),
            ),
            CoreError::DirectoryNotFound { path } => (
                format!("Directory not found: {}", path.display()),
                Some("Pass --data-dir or set STUDIOBOARD_DATA_DIR".to_string()),
            ),
            CoreError::JsonParse { path, message, .. } => (
                format!("Invalid JSON in {}: {}", path.display(), message),
                Some("Validate JSON syntax with: jq . <file>".to_string()),
            ),
            _ => (error.to_string(), None),
        };

        Self {
            source,
            message,
            severity: ErrorSeverity::Error,
            suggestion,
        }
    }
}

/// Report of errors encountered during data loading
#[derive(Debug, Default)]
pub struct LoadReport {
    pub errors: Vec<LoadError>,
    pub clients_loaded: usize,
    pub entries_loaded: usize,
    pub entries_skipped: usize,
}

impl LoadReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: LoadError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, source: impl Into<String>, message: impl Into<String>) {
        self.errors.push(LoadError::warning(source, message));
    }

    pub fn has_fatal_errors(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.severity == ErrorSeverity::Fatal)
    }

    /// Returns true if there are any errors (including warnings)
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &LoadError> {
        self.errors
            .iter()
            .filter(|e| e.severity == ErrorSeverity::Warning)
    }

    /// Returns (warnings, errors, fatal)
    pub fn error_count(&self) -> (usize, usize, usize) {
        self.errors
            .iter()
            .fold((0, 0, 0), |(w, e, f), err| match err.severity {
                ErrorSeverity::Warning => (w + 1, e, f),
                ErrorSeverity::Error => (w, e + 1, f),
                ErrorSeverity::Fatal => (w, e, f + 1),
            })
    }
}

/// Degraded state indicator for the data store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DegradedState {
    /// Everything loaded successfully
    Healthy,
    /// Some data missing or skipped but functional
    PartialData {
        missing: Vec<String>,
        reason: String,
    },
}

impl DegradedState {
    pub fn is_healthy(&self) -> bool {
        matches!(self, DegradedState::Healthy)
    }

    pub fn is_degraded(&self) -> bool {
        !self.is_healthy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_report_severity_counting() {
        let mut report = LoadReport::new();
        report.add_warning("entries", "Skipped row 3");
        report.add_error(LoadError::from_core_error(
            "clients",
            &CoreError::InvalidConfig {
                message: "duplicate id".to_string(),
            },
        ));
        report.add_error(
            LoadError::from_core_error(
                "data-dir",
                &CoreError::DirectoryNotFound {
                    path: PathBuf::from("/missing"),
                },
            )
            .into_fatal(),
        );

        let (warnings, errors, fatal) = report.error_count();
        assert_eq!(warnings, 1);
        assert_eq!(errors, 1);
        assert_eq!(fatal, 1);
        assert!(report.has_fatal_errors());
        assert_eq!(report.warnings().count(), 1);
    }

    #[test]
    fn test_invalid_date_range_message() {
        let err = CoreError::InvalidDateRange {
            start: chrono::NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            end: chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid date range: 2025-04-01 is after 2025-03-01"
        );
    }

    #[test]
    fn test_from_core_error_suggestion() {
        let err = CoreError::DirectoryNotFound {
            path: PathBuf::from("/missing"),
        };
        let load_error = LoadError::from_core_error("data-dir", &err);
        assert!(load_error.message.contains("/missing"));
        assert!(load_error.suggestion.unwrap().contains("--data-dir"));
    }
}
