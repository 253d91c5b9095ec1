//! Configuration for the giga chat client.
//!
//! Settings come from an optional TOML file whose sections all fall back
//! to defaults, so a missing or partial file works. Secrets are never read
//! from the file: they come from the process environment (see [`env`]).
//!
//! ```rust,no_run
//! use giga_config::{load_config, Credentials};
//!
//! let config = load_config(None).expect("invalid config");
//! let credentials = Credentials::from_env().expect("missing credentials");
//! println!("{} via {}", config.chat.model, config.chat.base_url);
//! # let _ = credentials;
//! ```

pub mod env;
pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use env::{Credentials, ENV_AUTH_KEY, ENV_RQ_UID};
pub use schema::GigaConfig;

use std::path::Path;

use giga_common::ConfigError;

/// Load config from `path` when given, otherwise from the platform default
/// location. A missing default file yields defaults; a missing explicit
/// file is an error.
pub fn load_config(path: Option<&Path>) -> Result<GigaConfig, ConfigError> {
    load_config_with(path, |_| {})
}

/// Like [`load_config`], applying `overrides` (command-line flags) before
/// validation.
pub fn load_config_with(
    path: Option<&Path>,
    overrides: impl FnOnce(&mut GigaConfig),
) -> Result<GigaConfig, ConfigError> {
    let mut config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };
    overrides(&mut config);
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string (used by `--dump-config`).
pub fn config_to_json(config: &GigaConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
