//! Parsers for exported studio data files

pub mod clients;
pub mod entries;

pub use clients::ClientParser;
pub use entries::{validate_entries, validate_entry, EntryParser};

use crate::error::CoreError;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read and deserialize a JSON file, mapping IO and parse failures to `CoreError`
pub(crate) async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CoreError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CoreError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            CoreError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    serde_json::from_str(&content).map_err(|e| CoreError::JsonParse {
        path: path.to_path_buf(),
        message: e.to_string(),
        source: e,
    })
}
