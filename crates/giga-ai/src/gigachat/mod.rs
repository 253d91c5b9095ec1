//! GigaChat chat-completions client.
//!
//! Implements the `ChatEndpoint` trait over the streaming REST API:
//! one POST per turn, answered with an SSE body of completion chunks.

mod api;
mod client;
mod config;

pub use client::GigaChatClient;
pub use config::GigaChatConfig;
