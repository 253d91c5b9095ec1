use std::path::{Path, PathBuf};

use giga_common::ConfigError;
use serde::{Deserialize, Serialize};

/// Where user prompts come from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum PromptMode {
    /// A fixed list, handed to the conversation one prompt at a time.
    #[default]
    Scripted,
    /// Lines read from standard input until EOF or `/exit`.
    Interactive,
}

/// Prompt feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub mode: PromptMode,
    /// One prompt per line; blank lines and `#` comments are skipped.
    /// Takes precedence over `list`.
    pub file: Option<PathBuf>,
    pub list: Vec<String>,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            mode: PromptMode::Scripted,
            file: None,
            list: default_script(),
        }
    }
}

impl PromptsConfig {
    /// The scripted prompts for this config: the file's lines if a file is
    /// set, otherwise the inline list.
    pub fn resolve_script(&self) -> Result<Vec<String>, ConfigError> {
        match self.file {
            Some(ref path) => read_prompts_file(path),
            None => Ok(self.list.clone()),
        }
    }
}

/// The built-in conversation script.
pub fn default_script() -> Vec<String> {
    [
        "Привет! Я - Вася",
        "Хочу просто поболтать",
        "Угадай, как меня зовут?",
        "Какая сейчас температура в Москве?",
        "Какая сейчас температура в Санкт-Петербурге?",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn read_prompts_file(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound(path.to_path_buf())
        } else {
            ConfigError::ParseError(format!("failed to read {}: {e}", path.display()))
        }
    })?;
    Ok(parse_prompt_lines(&content))
}

pub(crate) fn parse_prompt_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_script_has_five_prompts() {
        let script = PromptsConfig::default().resolve_script().unwrap();
        assert_eq!(script.len(), 5);
        assert_eq!(script[0], "Привет! Я - Вася");
        assert!(script[3].contains("Москве"));
    }

    #[test]
    fn prompt_lines_skip_blanks_and_comments() {
        let lines = parse_prompt_lines("# greeting\nhello\n\n   \n  how are you?  \n#end\n");
        assert_eq!(lines, vec!["hello", "how are you?"]);
    }

    #[test]
    fn file_takes_precedence_over_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompts.txt");
        std::fs::write(&path, "first\nsecond\n").unwrap();

        let config = PromptsConfig {
            file: Some(path),
            ..PromptsConfig::default()
        };
        assert_eq!(config.resolve_script().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn missing_prompts_file_is_reported() {
        let config = PromptsConfig {
            file: Some(PathBuf::from("/tmp/nonexistent_giga_prompts.txt")),
            ..PromptsConfig::default()
        };
        assert!(matches!(
            config.resolve_script(),
            Err(ConfigError::FileNotFound(_))
        ));
    }

    #[test]
    fn mode_deserializes_lowercase() {
        let config: PromptsConfig = toml::from_str("mode = \"interactive\"").unwrap();
        assert_eq!(config.mode, PromptMode::Interactive);
        assert_eq!(config.list.len(), 5);
    }
}
