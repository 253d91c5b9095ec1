//! Conversation engine for the GigaChat streaming chat service.
//!
//! Provides:
//! - the turn state machine ([`SessionDriver`]) that feeds prompts into a
//!   streamed exchange and resumes it after function calls
//! - streamed-turn accumulation ([`TurnAccumulator`])
//! - a tool registry with the `get_current_temperature` tool
//! - GigaChat collaborators: OAuth tokens, trust-bundle HTTP client and the
//!   SSE chat-completions endpoint

pub mod accumulator;
pub mod auth;
pub mod channel;
pub mod gigachat;
pub mod history;
pub mod prompts;
pub mod session;
pub mod streaming;
pub mod tools;

#[cfg(test)]
mod test_support;

use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use giga_common::{ConfigError, GigaError, Model};
use tokio_util::sync::CancellationToken;

pub use accumulator::{AccumulatedTurn, TurnAccumulator};
pub use auth::{AccessToken, OAuthClient, OAuthConfig, TokenProvider};
pub use channel::{build_http_client, TrustBundle};
pub use gigachat::{GigaChatClient, GigaChatConfig};
pub use history::History;
pub use prompts::{LinePrompts, PromptSource, ScriptedPrompts};
pub use session::{RunSummary, SessionDriver};
pub use tools::{CurrentTemperature, Tool, ToolDispatcher, ToolError};

/// Fragments of one streamed turn, ending at end-of-stream.
pub type FragmentStream = BoxStream<'static, Result<StreamFragment, AiError>>;

/// A remote chat service that answers one request with a stream of
/// fragments.
#[async_trait]
pub trait ChatEndpoint: Send + Sync {
    async fn open_stream(&self, request: &ChatRequest<'_>) -> Result<FragmentStream, AiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
    Function,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Function => "function",
        }
    }

    pub fn from_wire(s: &str) -> Option<Role> {
        match s {
            "system" => Some(Role::System),
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            "function" => Some(Role::Function),
            _ => None,
        }
    }
}

/// Why the model stopped a turn. `None` means the turn has not finished.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FinishReason {
    #[default]
    None,
    Stop,
    Length,
    FunctionCall,
    Blacklist,
    Error,
    /// A wire value this client does not know.
    Unrecognized(String),
}

impl FinishReason {
    pub fn from_wire(s: &str) -> FinishReason {
        match s {
            "" => FinishReason::None,
            "stop" => FinishReason::Stop,
            "length" => FinishReason::Length,
            "function_call" => FinishReason::FunctionCall,
            "blacklist" => FinishReason::Blacklist,
            "error" => FinishReason::Error,
            other => FinishReason::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FinishReason::None => "",
            FinishReason::Stop => "stop",
            FinishReason::Length => "length",
            FinishReason::FunctionCall => "function_call",
            FinishReason::Blacklist => "blacklist",
            FinishReason::Error => "error",
            FinishReason::Unrecognized(s) => s,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, FinishReason::None)
    }
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinishReason::None => f.write_str("<none>"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// A function invocation requested by the model. `arguments` is the JSON
/// text exactly as the service produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

/// One conversation entry. Never mutated once appended to [`History`].
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: Option<String>,
    pub function_call: Option<FunctionCall>,
    /// Tool that produced a function-role message.
    pub name: Option<String>,
}

impl Message {
    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            function_call: None,
            name: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(Role::Assistant, content)
    }

    /// The assistant's side of a function-call turn: the call, no text.
    pub fn function_call(role: Role, call: FunctionCall) -> Self {
        Self {
            role,
            content: None,
            function_call: Some(call),
            name: None,
        }
    }

    pub fn function_result(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Function,
            content: Some(content.into()),
            function_call: None,
            name: Some(name.into()),
        }
    }
}

/// One candidate inside a streamed fragment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alternative {
    /// Wire role; empty when the fragment does not repeat it.
    pub role: String,
    pub content: String,
    pub finish_reason: FinishReason,
    pub function_call: Option<FunctionCall>,
}

/// One unit received from an open stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamFragment {
    pub alternatives: Vec<Alternative>,
}

/// A worked example attached to a tool declaration.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FewShotExample {
    pub request: String,
    pub params: serde_json::Value,
}

/// A function the model may call.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_parameters: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub few_shot_examples: Vec<FewShotExample>,
}

/// Whether the model may decide to call functions on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FunctionCallPolicy {
    #[default]
    Auto,
    None,
}

impl FunctionCallPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionCallPolicy::Auto => "auto",
            FunctionCallPolicy::None => "none",
        }
    }
}

/// Everything sent when a stream is opened.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub model: Model,
    pub messages: &'a [Message],
    pub functions: &'a [ToolDeclaration],
    pub function_call: FunctionCallPolicy,
}

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Auth error: {0}")]
    Auth(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("Cancelled")]
    Cancelled,
}

/// The remote side or a tool broke the conversation contract.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Unexpected finish reason: {0}")]
    UnexpectedFinishReason(FinishReason),
    #[error("Turn finished with function_call but carried no call")]
    MissingFunctionCall,
    #[error("Malformed stream chunk: {0}")]
    MalformedChunk(String),
    #[error("More than {0} consecutive function calls")]
    ToolRoundLimit(u32),
    #[error(transparent)]
    Tool(#[from] ToolError),
}

impl From<ToolError> for AiError {
    fn from(e: ToolError) -> Self {
        AiError::Protocol(ProtocolError::Tool(e))
    }
}

impl From<AiError> for GigaError {
    fn from(e: AiError) -> Self {
        match e {
            AiError::Config(e) => GigaError::Config(e),
            AiError::Auth(msg) => GigaError::Auth(msg),
            AiError::Transport(msg) => GigaError::Transport(msg),
            AiError::Protocol(e) => GigaError::Protocol(e.to_string()),
            AiError::Cancelled => GigaError::Cancelled,
        }
    }
}

/// Run `fut` unless `cancel` fires first.
pub async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, AiError>
where
    F: Future<Output = Result<T, AiError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AiError::Cancelled),
        result = fut => result,
    }
}
