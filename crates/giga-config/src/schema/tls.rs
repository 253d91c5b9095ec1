use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Trust bundle and HTTP timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// PEM certificate-authority files. Every file must load.
    pub ca_files: Vec<PathBuf>,
    /// Valid range: 1-600.
    pub connect_timeout_secs: u64,
    /// Longest wait for the next piece of a response. Valid range: 1-600.
    pub read_timeout_secs: u64,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            ca_files: vec![
                PathBuf::from("certs/russian_trusted_root_ca_pem.crt"),
                PathBuf::from("certs/russian_trusted_sub_ca_2024_pem.crt"),
                PathBuf::from("certs/russian_trusted_sub_ca_pem.crt"),
            ],
            connect_timeout_secs: 10,
            read_timeout_secs: 120,
        }
    }
}
