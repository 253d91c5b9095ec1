use serde::{Deserialize, Serialize};

/// OAuth token endpoint settings. The credentials themselves live in the
/// environment, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub url: String,
    pub scope: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            url: "https://ngw.devices.sberbank.ru:9443/api/v2/oauth".into(),
            scope: "GIGACHAT_API_PERS".into(),
        }
    }
}
