//! Configuration schema types.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod auth;
mod chat;
mod prompts;
mod system;
mod tls;

pub use auth::*;
pub use chat::*;
pub use prompts::*;
pub use system::*;
pub use tls::*;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct GigaConfig {
    pub chat: ChatConfig,
    pub auth: AuthConfig,
    pub tls: TlsConfig,
    pub prompts: PromptsConfig,
    pub logging: LoggingConfig,
    pub run: RunConfig,
}
