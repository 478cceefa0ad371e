use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Knobs for the transactor. Every field has a default so partial files load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactorConfig {
    /// Print the slave device path when an instance is created.
    pub announce: bool,
    /// Log every byte moved with its escaped rendering.
    pub trace_bytes: bool,
    /// Entries kept in the traffic log; 0 disables it.
    pub traffic_capacity: usize,
}

impl Default for TransactorConfig {
    fn default() -> Self {
        Self {
            announce: true,
            trace_bytes: false,
            traffic_capacity: 0,
        }
    }
}

impl TransactorConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
