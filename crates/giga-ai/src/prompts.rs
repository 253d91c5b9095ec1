//! User prompt feeds.
//!
//! A [`PromptSource`] yields prompts until it is exhausted; exhaustion is
//! the normal end of a conversation, not an error. Once `next` has returned
//! `None` it keeps returning `None`.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

/// Line that ends an interactive session.
pub const EXIT_COMMAND: &str = "/exit";

#[async_trait]
pub trait PromptSource: Send {
    /// Wait for the next prompt. `None` means the source is exhausted.
    async fn next(&mut self) -> Option<String>;
}

/// A fixed list of prompts, handed off one at a time by a background
/// producer task.
pub struct ScriptedPrompts {
    rx: mpsc::Receiver<String>,
    producer: JoinHandle<()>,
}

impl ScriptedPrompts {
    /// Spawns the producer; must be called inside a tokio runtime.
    pub fn new(prompts: Vec<String>) -> Self {
        let (tx, rx) = mpsc::channel(1);
        let producer = tokio::spawn(async move {
            for prompt in prompts {
                if tx.send(prompt).await.is_err() {
                    break;
                }
            }
        });
        Self { rx, producer }
    }
}

impl Drop for ScriptedPrompts {
    fn drop(&mut self) {
        self.producer.abort();
    }
}

#[async_trait]
impl PromptSource for ScriptedPrompts {
    async fn next(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}

/// Prompts read line by line. Blank lines are skipped; EOF or
/// [`EXIT_COMMAND`] ends the feed.
pub struct LinePrompts<R> {
    lines: Lines<R>,
    done: bool,
}

impl<R: AsyncBufRead + Unpin + Send> LinePrompts<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            done: false,
        }
    }
}

impl LinePrompts<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> PromptSource for LinePrompts<R> {
    async fn next(&mut self) -> Option<String> {
        while !self.done {
            match self.lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line == EXIT_COMMAND {
                        self.done = true;
                    } else if !line.is_empty() {
                        return Some(line.to_string());
                    }
                }
                Ok(None) => self.done = true,
                Err(e) => {
                    warn!(error = %e, "prompt input failed, ending conversation");
                    self.done = true;
                }
            }
        }
        None
    }
}
