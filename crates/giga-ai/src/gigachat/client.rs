//! GigaChat client struct, request building, and chunk decoding.

use futures_util::future;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::streaming::SseEvent;
use crate::{
    AiError, Alternative, ChatRequest, FinishReason, FragmentStream, FunctionCall, Message,
    ProtocolError, StreamFragment, ToolDeclaration,
};

use super::config::GigaChatConfig;

/// Data of the event that closes a stream.
pub(crate) const DONE_MARKER: &str = "[DONE]";

/// GigaChat API client.
pub struct GigaChatClient {
    pub(crate) config: GigaChatConfig,
    pub(crate) http: reqwest::Client,
}

impl GigaChatClient {
    /// `http` should already trust the service's certificate chain.
    pub fn new(http: reqwest::Client, config: GigaChatConfig) -> Self {
        Self { config, http }
    }

    pub(crate) fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Build the request body for a streamed completion.
    pub(crate) fn build_request_body<'a>(&self, request: &ChatRequest<'a>) -> WireRequest<'a> {
        let with_functions = !request.functions.is_empty();
        WireRequest {
            model: request.model.as_str(),
            messages: request.messages.iter().map(WireMessage::from).collect(),
            functions: request.functions,
            function_call: with_functions.then(|| request.function_call.as_str()),
            stream: true,
        }
    }
}

#[derive(Serialize)]
pub(crate) struct WireRequest<'a> {
    model: &'static str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    functions: &'a [ToolDeclaration],
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<&'static str>,
    stream: bool,
}

#[derive(Serialize)]
pub(crate) struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<WireFunctionCall<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
pub(crate) struct WireFunctionCall<'a> {
    name: &'a str,
    arguments: Value,
}

impl<'a> From<&'a Message> for WireMessage<'a> {
    fn from(msg: &'a Message) -> Self {
        Self {
            role: msg.role.as_str(),
            content: msg.content.as_deref().unwrap_or_default(),
            function_call: msg.function_call.as_ref().map(|call| WireFunctionCall {
                name: &call.name,
                // The service expects an object here; keep the raw text if
                // it is not valid JSON.
                arguments: serde_json::from_str(&call.arguments)
                    .unwrap_or_else(|_| Value::String(call.arguments.clone())),
            }),
            name: msg.name.as_deref(),
        }
    }
}

#[derive(Deserialize)]
struct WireChunk {
    #[serde(default)]
    choices: Vec<WireChoice>,
}

#[derive(Deserialize)]
struct WireChoice {
    #[serde(default)]
    delta: WireDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Default)]
struct WireDelta {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    function_call: Option<WireCallDelta>,
}

#[derive(Deserialize)]
struct WireCallDelta {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Decode the data of one SSE event into a fragment.
pub(crate) fn decode_chunk(data: &str) -> Result<StreamFragment, AiError> {
    let chunk: WireChunk = serde_json::from_str(data)
        .map_err(|e| ProtocolError::MalformedChunk(format!("{e}: {data}")))?;

    let alternatives = chunk
        .choices
        .into_iter()
        .map(|choice| Alternative {
            role: choice.delta.role.unwrap_or_default(),
            content: choice.delta.content.unwrap_or_default(),
            finish_reason: FinishReason::from_wire(choice.finish_reason.as_deref().unwrap_or("")),
            function_call: choice.delta.function_call.map(|call| FunctionCall {
                name: call.name,
                arguments: arguments_text(call.arguments),
            }),
        })
        .collect();

    Ok(StreamFragment { alternatives })
}

/// Arguments arrive as a JSON object; some deployments send them as a
/// pre-encoded string instead.
fn arguments_text(arguments: Value) -> String {
    match arguments {
        Value::String(s) => s,
        Value::Null => "{}".to_string(),
        other => other.to_string(),
    }
}

/// Fragments carried by `events`, up to the `[DONE]` marker.
pub(crate) fn fragments(
    events: BoxStream<'static, Result<SseEvent, AiError>>,
) -> FragmentStream {
    events
        .take_while(|event| {
            future::ready(!matches!(event, Ok(e) if e.data.trim() == DONE_MARKER))
        })
        .map(|event| event.and_then(|e| decode_chunk(&e.data)))
        .boxed()
}
