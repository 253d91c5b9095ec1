//! Conversation session.
//!
//! A [`SessionDriver`] owns the conversation history and runs the turn
//! state machine: pull a prompt, stream the reply, and either commit it or
//! run the requested tool and resume the stream.

mod driver;
mod state;


pub use driver::{ChunkSink, RunSummary, SessionDriver};
pub use state::TurnState;
