use std::path::PathBuf;

use clap::Parser;
use giga_common::Model;
use giga_config::schema::PromptMode;
use giga_config::GigaConfig;

/// giga: a streaming GigaChat conversation with client-side function calls.
#[derive(Parser, Debug)]
#[command(name = "giga", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (debug, info, warn, error) or a full filter
    /// directive. `RUST_LOG` still wins when set.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Read prompts from standard input until EOF or `/exit`.
    #[arg(short, long, conflicts_with = "prompts_file")]
    pub interactive: bool,

    /// Run the prompts in this file, one per line.
    #[arg(short, long)]
    pub prompts_file: Option<PathBuf>,

    /// Chat model (GigaChat, GigaChat-Plus, GigaChat-Pro, GigaChat-Max).
    #[arg(short, long)]
    pub model: Option<Model>,

    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    pub dump_config: bool,
}

impl Args {
    /// Apply command-line overrides on top of the loaded file.
    pub fn apply_overrides(&self, config: &mut GigaConfig) {
        if let Some(model) = self.model {
            config.chat.model = model;
        }
        if self.interactive {
            config.prompts.mode = PromptMode::Interactive;
        }
        if let Some(ref path) = self.prompts_file {
            config.prompts.mode = PromptMode::Scripted;
            config.prompts.file = Some(path.clone());
        }
        if let Some(ref level) = self.log_level {
            config.logging.level = level.clone();
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
