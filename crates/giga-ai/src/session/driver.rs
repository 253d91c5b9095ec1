//! The turn state machine.

use futures_util::StreamExt;
use giga_common::{turn_tag, Model};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::accumulator::{AccumulatedTurn, TurnAccumulator};
use crate::history::History;
use crate::prompts::PromptSource;
use crate::tools::ToolDispatcher;
use crate::{
    cancellable, AiError, ChatEndpoint, ChatRequest, FinishReason, FunctionCallPolicy, Message,
    ProtocolError, Role,
};

use super::state::TurnState;

/// Receives every non-blank content delta the moment it arrives.
pub type ChunkSink = Box<dyn Fn(&str) + Send + Sync>;

/// What a finished run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// User prompts consumed.
    pub prompts: usize,
    /// Turns that ended with `stop`.
    pub turns: usize,
    /// Function calls executed.
    pub tool_calls: usize,
    pub history_len: usize,
}

/// Drives a conversation: owns the history and the in-flight turn.
pub struct SessionDriver {
    model: Model,
    history: History,
    tools: ToolDispatcher,
    accumulator: TurnAccumulator,
    /// Consecutive function-call turns allowed before the run fails.
    /// Unlimited when unset.
    max_tool_rounds: Option<u32>,
    cancel: CancellationToken,
    on_chunk: ChunkSink,
}

impl SessionDriver {
    /// A driver whose history starts with `system_prompt`.
    pub fn new(model: Model, system_prompt: impl Into<String>) -> Self {
        let mut history = History::new();
        history.append(Message::system(system_prompt));
        Self {
            model,
            history,
            tools: ToolDispatcher::new(),
            accumulator: TurnAccumulator::new(),
            max_tool_rounds: None,
            cancel: CancellationToken::new(),
            on_chunk: Box::new(|chunk| info!("{chunk}")),
        }
    }

    pub fn with_tools(mut self, tools: ToolDispatcher) -> Self {
        self.tools = tools;
        self
    }

    /// Fail the run after `max` consecutive function-call turns.
    pub fn with_max_tool_rounds(mut self, max: u32) -> Self {
        self.max_tool_rounds = Some(max);
        self
    }

    /// Share a cancellation token with the caller. Cancelling it abandons
    /// the in-flight turn and fails the run.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_chunk_sink(mut self, sink: ChunkSink) -> Self {
        self.on_chunk = sink;
        self
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Run the conversation until `prompts` is exhausted.
    ///
    /// Any error is fatal: the run stops and the in-flight turn is not
    /// committed to history.
    pub async fn run(
        &mut self,
        endpoint: &dyn ChatEndpoint,
        prompts: &mut dyn PromptSource,
    ) -> Result<RunSummary, AiError> {
        let mut summary = RunSummary::default();
        let mut state = TurnState::AwaitingPrompt;
        let mut tool_rounds = 0u32;

        loop {
            debug!(state = state.name(), history = self.history.len(), "session step");

            state = match state {
                TurnState::AwaitingPrompt => {
                    let next = cancellable(&self.cancel, async { Ok(prompts.next().await) }).await?;
                    let Some(prompt) = next else {
                        break;
                    };
                    info!(">>> {prompt}");
                    self.history.append(Message::user(prompt));
                    summary.prompts += 1;
                    TurnState::StreamOpen
                }

                TurnState::StreamOpen => {
                    let turn = self.stream_turn(endpoint).await?;
                    let reason = turn.finish_reason.clone();
                    match reason {
                        FinishReason::Stop => TurnState::TurnStop(turn),
                        FinishReason::FunctionCall => TurnState::TurnFunctionCall(turn),
                        other => return Err(ProtocolError::UnexpectedFinishReason(other).into()),
                    }
                }

                TurnState::TurnStop(turn) => {
                    self.history.append(Message {
                        role: turn_role(&turn.role),
                        content: Some(turn.text),
                        function_call: None,
                        name: None,
                    });
                    summary.turns += 1;
                    tool_rounds = 0;
                    TurnState::AwaitingPrompt
                }

                TurnState::TurnFunctionCall(turn) => {
                    tool_rounds += 1;
                    if let Some(max) = self.max_tool_rounds {
                        if tool_rounds > max {
                            return Err(ProtocolError::ToolRoundLimit(max).into());
                        }
                    }
                    let call = turn
                        .function_call
                        .ok_or(ProtocolError::MissingFunctionCall)?;

                    self.history
                        .append(Message::function_call(turn_role(&turn.role), call.clone()));
                    let result = self.tools.execute(&call)?;
                    self.history
                        .append(Message::function_result(call.name, result));
                    summary.tool_calls += 1;
                    // The tool result is the next input: no new prompt.
                    TurnState::StreamOpen
                }
            };
        }

        summary.history_len = self.history.len();
        info!(
            turns = summary.turns,
            tool_calls = summary.tool_calls,
            "conversation finished"
        );
        Ok(summary)
    }

    /// Open one stream with the current history and absorb it to the end.
    async fn stream_turn(&mut self, endpoint: &dyn ChatEndpoint) -> Result<AccumulatedTurn, AiError> {
        self.accumulator.reset();

        let tag = turn_tag();
        let request = ChatRequest {
            model: self.model,
            messages: self.history.snapshot_for_request(),
            functions: self.tools.declarations(),
            function_call: FunctionCallPolicy::Auto,
        };
        debug!(%tag, messages = request.messages.len(), "opening stream");

        let mut stream = cancellable(&self.cancel, endpoint.open_stream(&request)).await?;
        let mut fragments = 0usize;
        while let Some(fragment) =
            cancellable(&self.cancel, async { Ok(stream.next().await) }).await?
        {
            let fragment = fragment?;
            let sink = &self.on_chunk;
            self.accumulator.absorb_with(&fragment, |text| sink(text));
            fragments += 1;
        }

        let turn = self.accumulator.finalize();
        debug!(
            %tag,
            fragments,
            finish_reason = %turn.finish_reason,
            "stream closed"
        );
        Ok(turn)
    }
}

/// Role for a committed model turn. The service normally says `assistant`;
/// anything else is recorded as the assistant too.
fn turn_role(wire: &str) -> Role {
    match Role::from_wire(wire) {
        Some(Role::Assistant) => Role::Assistant,
        None if wire.is_empty() => Role::Assistant,
        _ => {
            warn!(role = wire, "unexpected role in model turn, recording as assistant");
            Role::Assistant
        }
    }
}
