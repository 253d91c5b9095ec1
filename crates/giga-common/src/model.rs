//! Chat model identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A GigaChat model. The wire name is spelled out per variant; never
/// derive it from the variant's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Model {
    #[serde(rename = "GigaChat")]
    GigaChat,
    #[serde(rename = "GigaChat-Plus")]
    GigaChatPlus,
    #[serde(rename = "GigaChat-Pro")]
    GigaChatPro,
    #[default]
    #[serde(rename = "GigaChat-Max")]
    GigaChatMax,
}

impl Model {
    pub const ALL: [Model; 4] = [
        Model::GigaChat,
        Model::GigaChatPlus,
        Model::GigaChatPro,
        Model::GigaChatMax,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Model::GigaChat => "GigaChat",
            Model::GigaChatPlus => "GigaChat-Plus",
            Model::GigaChatPro => "GigaChat-Pro",
            Model::GigaChatMax => "GigaChat-Max",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Model::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown model: {s}"))
    }
}
