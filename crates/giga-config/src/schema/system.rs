//! Logging and run-control settings.

use serde::{Deserialize, Serialize};

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "giga=info".into(),
        }
    }
}

/// Run-level limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct RunConfig {
    /// Cancel the whole run after this many seconds. 0 disables the deadline.
    pub deadline_secs: u64,
}
