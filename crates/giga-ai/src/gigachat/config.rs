//! GigaChat client configuration.

use giga_common::SessionId;

pub const DEFAULT_BASE_URL: &str = "https://gigachat.devices.sberbank.ru/api/v1";

#[derive(Clone)]
pub struct GigaChatConfig {
    /// API root; `/chat/completions` is appended.
    pub base_url: String,
    pub access_token: String,
    /// Sent as `X-Session-ID` on every request of the run.
    pub session_id: SessionId,
}

impl std::fmt::Debug for GigaChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GigaChatConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &"[REDACTED]")
            .field("session_id", &self.session_id)
            .finish()
    }
}

impl GigaChatConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: access_token.into(),
            session_id: SessionId::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = session_id;
        self
    }
}
