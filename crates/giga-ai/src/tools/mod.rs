//! Client-side functions the model can call.
//!
//! Every tool declares itself to the model through a [`ToolDeclaration`]
//! and is looked up by name when a function-call turn arrives.

mod temperature;

pub use temperature::CurrentTemperature;

use std::collections::{BTreeMap, HashMap};

use tracing::info;

use crate::{FunctionCall, ToolDeclaration};

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unexpected function name: {0}")]
    UnknownFunction(String),
    #[error("Couldn't parse arguments of {name}: {reason}")]
    InvalidArguments { name: String, reason: String },
}

/// A function with JSON arguments and a JSON result.
pub trait Tool: Send + Sync {
    fn declaration(&self) -> ToolDeclaration;

    /// Run the tool on the raw JSON argument text.
    fn call(&self, arguments: &str) -> Result<serde_json::Value, ToolError>;
}

/// Registry of tools, keyed by name.
#[derive(Default)]
pub struct ToolDispatcher {
    tools: HashMap<String, Box<dyn Tool>>,
    declarations: Vec<ToolDeclaration>,
}

impl ToolDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in tool set.
    pub fn builtin() -> Self {
        Self::new().with_tool(CurrentTemperature)
    }

    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Self {
        self.register(tool);
        self
    }

    /// Register a tool. A later tool with the same name replaces the earlier one.
    pub fn register(&mut self, tool: impl Tool + 'static) {
        let declaration = tool.declaration();
        self.declarations.retain(|d| d.name != declaration.name);
        self.tools.insert(declaration.name.clone(), Box::new(tool));
        self.declarations.push(declaration);
    }

    /// Declarations of every registered tool, in registration order.
    pub fn declarations(&self) -> &[ToolDeclaration] {
        &self.declarations
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute `call` and return the result as compact JSON text.
    pub fn execute(&self, call: &FunctionCall) -> Result<String, ToolError> {
        info!(function = %call.name, arguments = %call.arguments, "execute function");

        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| ToolError::UnknownFunction(call.name.clone()))?;
        let result = tool.call(&call.arguments)?;
        Ok(result.to_string())
    }
}

/// Parse arguments shaped as a flat object of string values.
pub(crate) fn string_arguments(
    name: &str,
    arguments: &str,
) -> Result<BTreeMap<String, String>, ToolError> {
    serde_json::from_str(arguments).map_err(|e| ToolError::InvalidArguments {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl Tool for Echo {
        fn declaration(&self) -> ToolDeclaration {
            ToolDeclaration {
                name: "echo".into(),
                description: "Return the arguments".into(),
                parameters: serde_json::json!({"type": "object"}),
                return_parameters: None,
                few_shot_examples: Vec::new(),
            }
        }

        fn call(&self, arguments: &str) -> Result<serde_json::Value, ToolError> {
            let args = string_arguments("echo", arguments)?;
            Ok(serde_json::json!(args))
        }
    }

    fn call(name: &str, args: &str) -> FunctionCall {
        FunctionCall {
            name: name.into(),
            arguments: args.into(),
        }
    }

    #[test]
    fn unknown_function_rejected() {
        let dispatcher = ToolDispatcher::builtin();
        let err = dispatcher
            .execute(&call("get_weather", r#"{"location":"Москва"}"#))
            .unwrap_err();
        assert!(matches!(err, ToolError::UnknownFunction(ref n) if n == "get_weather"));
    }

    #[test]
    fn dispatches_by_name() {
        let dispatcher = ToolDispatcher::builtin().with_tool(Echo);
        let out = dispatcher.execute(&call("echo", r#"{"k":"v"}"#)).unwrap();
        assert_eq!(out, r#"{"k":"v"}"#);

        let names: Vec<&str> = dispatcher
            .declarations()
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["get_current_temperature", "echo"]);
    }

    #[test]
    fn re_registering_replaces_declaration() {
        let mut dispatcher = ToolDispatcher::new();
        dispatcher.register(Echo);
        dispatcher.register(Echo);
        assert_eq!(dispatcher.declarations().len(), 1);
    }

    #[test]
    fn non_string_values_are_invalid_arguments() {
        let err = string_arguments("echo", r#"{"location": 5}"#).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { ref name, .. } if name == "echo"));

        let err = string_arguments("echo", "not json").unwrap_err();
        assert!(err.to_string().contains("Couldn't parse arguments of echo"));
    }

    #[test]
    fn empty_dispatcher() {
        let dispatcher = ToolDispatcher::new();
        assert!(dispatcher.is_empty());
        assert!(dispatcher.declarations().is_empty());
    }
}
