//! Full configuration validation.
//!
//! Collects every problem into one `ValidationError` so a user fixes the
//! file in a single pass.

use crate::schema::{GigaConfig, PromptMode};
use giga_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &GigaConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    // Endpoints
    validate_url(&mut errors, "chat.base_url", &config.chat.base_url);
    validate_url(&mut errors, "auth.url", &config.auth.url);
    validate_non_empty(&mut errors, "auth.scope", &config.auth.scope);

    // Conversation
    validate_non_empty(&mut errors, "chat.system_prompt", &config.chat.system_prompt);
    if let Some(max) = config.chat.max_tool_rounds {
        validate_range(&mut errors, "chat.max_tool_rounds", max as u64, 1, 64);
    }

    // TLS
    if config.tls.ca_files.is_empty() {
        errors.push("tls.ca_files must list at least one certificate file".into());
    }
    validate_range(
        &mut errors,
        "tls.connect_timeout_secs",
        config.tls.connect_timeout_secs,
        1,
        600,
    );
    validate_range(
        &mut errors,
        "tls.read_timeout_secs",
        config.tls.read_timeout_secs,
        1,
        600,
    );

    // Prompts
    if config.prompts.mode == PromptMode::Scripted
        && config.prompts.file.is_none()
        && config.prompts.list.iter().all(|p| p.trim().is_empty())
    {
        errors.push("prompts.list is empty and no prompts.file is set".into());
    }

    validate_non_empty(&mut errors, "logging.level", &config.logging.level);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_range(errors: &mut Vec<String>, name: &str, value: u64, min: u64, max: u64) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

fn validate_non_empty(errors: &mut Vec<String>, name: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(format!("{name} must not be empty"));
    }
}

fn validate_url(errors: &mut Vec<String>, name: &str, value: &str) {
    if !(value.starts_with("https://") || value.starts_with("http://")) {
        errors.push(format!("{name} = {value:?} is not an http(s) URL"));
    }
}
