//! Server-Sent Events (SSE) streaming parser.
//!
//! The chat-completions endpoint answers a streamed request with an SSE
//! body. This module turns any buffered byte source into a stream of
//! events, so the caller can react to every event as it arrives.

use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio_util::io::StreamReader;

use crate::AiError;

/// A single SSE event parsed from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// The `event:` field, when the server sends one.
    pub event: Option<String>,
    /// The event data; multi-line data is joined with `\n`.
    pub data: String,
}

struct SseState<R> {
    lines: Lines<R>,
    event: Option<String>,
    data: String,
    done: bool,
}

impl<R> SseState<R> {
    fn take_event(&mut self) -> SseEvent {
        SseEvent {
            event: self.event.take(),
            data: std::mem::take(&mut self.data),
        }
    }
}

/// Events of a streamed reqwest response body.
pub fn sse_events(response: reqwest::Response) -> BoxStream<'static, Result<SseEvent, AiError>> {
    let byte_stream = response
        .bytes_stream()
        .map(|result| result.map_err(std::io::Error::other))
        .boxed();
    sse_from_reader(BufReader::new(StreamReader::new(byte_stream)))
}

/// Events read line by line from `reader`. A read error ends the stream
/// after it has been yielded.
pub fn sse_from_reader<R>(reader: R) -> BoxStream<'static, Result<SseEvent, AiError>>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let state = SseState {
        lines: reader.lines(),
        event: None,
        data: String::new(),
        done: false,
    };

    stream::unfold(state, |mut st| async move {
        if st.done {
            return None;
        }
        loop {
            let line = match st.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    st.done = true;
                    // Flush an event the server did not terminate.
                    if st.data.is_empty() {
                        return None;
                    }
                    let event = st.take_event();
                    return Some((Ok(event), st));
                }
                Err(e) => {
                    st.done = true;
                    return Some((Err(AiError::Transport(e.to_string())), st));
                }
            };

            if line.is_empty() {
                // Empty line = end of event
                if !st.data.is_empty() {
                    let event = st.take_event();
                    return Some((Ok(event), st));
                }
                st.event = None;
                continue;
            }

            if let Some(event_type) = field(&line, "event") {
                st.event = Some(event_type.to_string());
            } else if let Some(data) = field(&line, "data") {
                if !st.data.is_empty() {
                    st.data.push('\n');
                }
                st.data.push_str(data);
            }
            // id:, retry: and comment lines carry nothing we use
        }
    })
    .boxed()
}

fn field<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let value = line.strip_prefix(name)?.strip_prefix(':')?;
    Some(value.strip_prefix(' ').unwrap_or(value))
}
