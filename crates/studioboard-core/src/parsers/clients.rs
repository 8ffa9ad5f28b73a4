//! Client list parser

use crate::error::{CoreError, LoadError, LoadReport};
use std::collections::HashSet;
use std::path::Path;
use studioboard_types::Client;
use tracing::warn;

use super::read_json;

/// Parser for `clients.json` (a JSON array of clients with retainer terms)
#[derive(Debug, Default)]
pub struct ClientParser;

impl ClientParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse the client list, rejecting duplicate ids
    pub async fn parse(&self, path: &Path) -> Result<Vec<Client>, CoreError> {
        let clients: Vec<Client> = read_json(path).await?;

        let mut seen = HashSet::new();
        for client in &clients {
            if !seen.insert(client.id.as_str()) {
                return Err(CoreError::InvalidConfig {
                    message: format!("Duplicate client id '{}' in {}", client.id, path.display()),
                });
            }
        }

        Ok(clients)
    }

    /// Parse with graceful degradation, recording errors in LoadReport.
    ///
    /// A missing clients file is fatal: nothing can be reported without retainer terms.
    /// Returns `None` when the file could not be loaded.
    pub async fn parse_graceful(
        &self,
        path: &Path,
        report: &mut LoadReport,
    ) -> Option<Vec<Client>> {
        match self.parse(path).await {
            Ok(clients) => {
                report.clients_loaded += clients.len();
                Some(clients)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load clients");
                report.add_error(LoadError::from_core_error("clients", &e).into_fatal());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_parse_clients() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"[
                {{"id": "acme", "name": "Acme Ltd", "retainer": {{"monthlyHours": 40, "rolloverHours": 8}}}},
                {{"id": "globex", "name": "Globex"}}
            ]"#
        )
        .unwrap();

        let clients = ClientParser::new().parse(file.path()).await.unwrap();
        assert_eq!(clients.len(), 2);
        assert_eq!(clients[0].retainer.monthly_hours, Some(40.0));
        assert_eq!(clients[1].retainer.hours_per_day, None);
    }

    #[tokio::test]
    async fn test_parse_rejects_duplicate_ids() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"[{{"id": "acme", "name": "A"}}, {{"id": "acme", "name": "B"}}]"#
        )
        .unwrap();

        let result = ClientParser::new().parse(file.path()).await;
        assert!(matches!(result, Err(CoreError::InvalidConfig { .. })));
    }

    #[tokio::test]
    async fn test_parse_graceful_missing_is_fatal() {
        let mut report = LoadReport::new();
        let clients = ClientParser::new()
            .parse_graceful(Path::new("/nonexistent/clients.json"), &mut report)
            .await;

        assert!(clients.is_none());
        assert!(report.has_fatal_errors());
    }
}
