//! Folds the fragments of one streamed turn into a single logical turn.
//!
//! The service may send the finish reason or the function call in an early
//! fragment while text keeps arriving later, or the other way round. Role,
//! finish reason and function call therefore latch independently on the
//! first non-empty value seen, and text always keeps accumulating.

use crate::{FinishReason, FunctionCall, StreamFragment};

/// The reduction of every fragment received for one stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccumulatedTurn {
    /// First non-empty wire role seen; empty if none arrived.
    pub role: String,
    pub finish_reason: FinishReason,
    pub function_call: Option<FunctionCall>,
    /// Every non-blank trimmed content delta, each followed by `\n`.
    pub text: String,
}

#[derive(Debug, Default)]
pub struct TurnAccumulator {
    turn: AccumulatedTurn,
}

impl TurnAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.turn = AccumulatedTurn::default();
    }

    /// Absorb one fragment. Must be called in arrival order.
    pub fn absorb(&mut self, fragment: &StreamFragment) {
        self.absorb_with(fragment, |_| {});
    }

    /// Like [`absorb`](Self::absorb), handing every non-blank content delta
    /// to `on_text` as soon as it is appended.
    pub fn absorb_with(&mut self, fragment: &StreamFragment, mut on_text: impl FnMut(&str)) {
        let turn = &mut self.turn;
        for alt in &fragment.alternatives {
            if turn.role.is_empty() {
                turn.role = alt.role.clone();
            }
            if turn.finish_reason.is_none() {
                turn.finish_reason = alt.finish_reason.clone();
            }
            if turn.function_call.is_none() {
                turn.function_call = alt.function_call.clone();
            }

            let content = alt.content.trim();
            if !content.is_empty() {
                turn.text.push_str(content);
                turn.text.push('\n');
                on_text(content);
            }
        }
    }

    pub fn finalize(&self) -> AccumulatedTurn {
        self.turn.clone()
    }
}
