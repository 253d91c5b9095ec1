//! HTTPS client trusting an explicit certificate bundle.

use std::path::{Path, PathBuf};
use std::time::Duration;

use giga_common::ConfigError;
use tracing::debug;

use crate::AiError;

const PEM_MARKER: &str = "-----BEGIN CERTIFICATE-----";

/// Extra root certificates, loaded from PEM files.
#[derive(Default)]
pub struct TrustBundle {
    certificates: Vec<reqwest::Certificate>,
}

impl std::fmt::Debug for TrustBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustBundle")
            .field("certificates", &self.certificates.len())
            .finish()
    }
}

impl TrustBundle {
    /// Load every file. A missing, unreadable or non-PEM file fails the
    /// whole bundle.
    pub fn load(paths: &[PathBuf]) -> Result<Self, ConfigError> {
        let mut certificates = Vec::with_capacity(paths.len());
        for path in paths {
            let loaded = load_certificates(path)?;
            debug!(path = %path.display(), count = loaded.len(), "trusted certificates loaded");
            certificates.extend(loaded);
        }
        Ok(Self { certificates })
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }
}

/// Every certificate in one PEM file; a file may hold a whole chain.
fn load_certificates(path: &Path) -> Result<Vec<reqwest::Certificate>, ConfigError> {
    let trust_error = |reason: String| ConfigError::TrustStore {
        path: path.to_path_buf(),
        reason,
    };

    let pem = std::fs::read(path).map_err(|e| trust_error(e.to_string()))?;
    if !String::from_utf8_lossy(&pem).contains(PEM_MARKER) {
        return Err(trust_error("no PEM certificate found".to_string()));
    }
    let certificates =
        reqwest::Certificate::from_pem_bundle(&pem).map_err(|e| trust_error(e.to_string()))?;
    if certificates.is_empty() {
        return Err(trust_error("no PEM certificate found".to_string()));
    }
    Ok(certificates)
}

/// Build the shared HTTP client. The bundle is added on top of the
/// platform roots.
///
/// `read_timeout` bounds each wait for data, not the whole response, so a
/// long streamed answer survives as long as chunks keep arriving.
pub fn build_http_client(
    bundle: &TrustBundle,
    connect_timeout: Duration,
    read_timeout: Duration,
) -> Result<reqwest::Client, AiError> {
    let mut builder = reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .read_timeout(read_timeout);
    for cert in &bundle.certificates {
        builder = builder.add_root_certificate(cert.clone());
    }
    builder
        .build()
        .map_err(|e| AiError::Transport(format!("failed to build HTTP client: {e}")))
}
