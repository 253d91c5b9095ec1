use giga_common::Model;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SYSTEM_PROMPT: &str = "Ты умеешь поддержать беседу и ответить на любой вопрос";

/// Chat endpoint and conversation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub model: Model,
    /// Base URL of the chat API; `/chat/completions` is appended.
    pub base_url: String,
    /// Injected once as the first message of every run.
    pub system_prompt: String,
    /// Consecutive function-call turns allowed before the run fails (1-64).
    /// Unset means no limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tool_rounds: Option<u32>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: Model::GigaChatMax,
            base_url: "https://gigachat.devices.sberbank.ru/api/v1".into(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_tool_rounds: None,
        }
    }
}
