//! Credentials read from the process environment.

use std::fmt;

use giga_common::ConfigError;

/// Request correlation id sent as the `RqUID` header of the token request.
pub const ENV_RQ_UID: &str = "GIGACHAT_RQ_UID";
/// Base64 `client_id:client_secret` blob for the token request.
pub const ENV_AUTH_KEY: &str = "GIGACHAT_AUTH_KEY";

/// Startup credentials. Read once and passed explicitly to the auth client.
#[derive(Clone)]
pub struct Credentials {
    pub rq_uid: String,
    pub auth_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("rq_uid", &self.rq_uid)
            .field("auth_key", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve both variables through `lookup`. Unset and empty values are
    /// both treated as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnv(key.to_string()))
        };
        Ok(Self {
            rq_uid: require(ENV_RQ_UID)?,
            auth_key: require(ENV_AUTH_KEY)?,
        })
    }
}
