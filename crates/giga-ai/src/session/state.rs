//! States of the turn state machine.

use crate::AccumulatedTurn;

#[derive(Debug, Clone, PartialEq)]
pub enum TurnState {
    /// Waiting for the next user prompt. Entered at run start and after
    /// every completed `stop` turn.
    AwaitingPrompt,
    /// A stream is about to be opened with the current history.
    StreamOpen,
    /// The model finished speaking.
    TurnStop(AccumulatedTurn),
    /// The model asked for a function call.
    TurnFunctionCall(AccumulatedTurn),
}

impl TurnState {
    pub fn name(&self) -> &'static str {
        match self {
            TurnState::AwaitingPrompt => "awaiting_prompt",
            TurnState::StreamOpen => "stream_open",
            TurnState::TurnStop(_) => "turn_stop",
            TurnState::TurnFunctionCall(_) => "turn_function_call",
        }
    }
}
