//! Tool trait — the abstraction over agent capabilities.
//!
//! Tools are what let the agent act: search the web, fetch a page, and so
//! on. Every tool returns text, so its result can be appended to the
//! conversation uniformly.

use crate::error::{Error, ToolError};
use crate::message::MessageToolCall;
use crate::provider::ToolDefinition;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A parsed request to execute a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the LLM's tool_call.id)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Arguments as a JSON object
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Parse the raw argument text of a tool-call record.
    ///
    /// Blank or `null` argument text means "no arguments" and becomes `{}`.
    /// Anything else must be a JSON object.
    pub fn parse(raw: &MessageToolCall) -> Result<Self, ToolError> {
        let text = raw.arguments.trim();
        let arguments = if text.is_empty() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            let value: serde_json::Value = serde_json::from_str(text).map_err(|e| {
                ToolError::InvalidArguments(format!(
                    "arguments for '{}' are not valid JSON: {e}",
                    raw.name
                ))
            })?;
            match value {
                serde_json::Value::Object(map) => serde_json::Value::Object(map),
                serde_json::Value::Null => serde_json::Value::Object(serde_json::Map::new()),
                other => {
                    return Err(ToolError::InvalidArguments(format!(
                        "arguments for '{}' must be a JSON object, got {other}",
                        raw.name
                    )));
                }
            }
        };

        Ok(Self {
            id: raw.id.clone(),
            name: raw.name.clone(),
            arguments,
        })
    }
}

/// The outcome of executing one tool call inside the run loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// The call ID this result is for
    pub call_id: String,

    /// The tool that was invoked
    pub name: String,

    /// Text appended to the conversation (raw output or error payload)
    pub output: String,

    /// Whether the call failed
    pub is_error: bool,
}

/// The core Tool trait.
///
/// A tool either returns its text payload or fails with a [`ToolError`];
/// the run loop turns failures into conversation content.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "web_search").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: serde_json::Value) -> std::result::Result<String, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A fixed set of available tools.
///
/// The agent loop uses this to:
/// 1. Get tool definitions to send to the LLM
/// 2. Look up and execute tools when the LLM requests them
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
    by_name: HashMap<String, usize>,
    definitions: Vec<ToolDefinition>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    /// Build a registry. Fails when `tools` is empty or two tools share a name.
    pub fn new(tools: Vec<Box<dyn Tool>>) -> crate::Result<Self> {
        if tools.is_empty() {
            return Err(Error::config("tool registry requires at least one tool"));
        }

        let mut by_name = HashMap::with_capacity(tools.len());
        for (i, tool) in tools.iter().enumerate() {
            if by_name.insert(tool.name().to_string(), i).is_some() {
                return Err(Error::config(format!(
                    "duplicate tool name '{}' in registry",
                    tool.name()
                )));
            }
        }

        let definitions = tools.iter().map(|t| t.to_definition()).collect();
        Ok(Self {
            tools,
            by_name,
            definitions,
        })
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.by_name.get(name).map(|&i| self.tools[i].as_ref())
    }

    /// All tool definitions in registration order (for sending to the LLM).
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Execute a tool by name. Absent input is passed as `{}`.
    pub async fn execute(
        &self,
        name: &str,
        input: Option<serde_json::Value>,
    ) -> std::result::Result<String, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        let input = input.unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));
        tool.execute(input).await
    }

    /// Execute a parsed tool call.
    pub async fn execute_call(&self, call: &ToolCall) -> std::result::Result<String, ToolError> {
        self.execute(&call.name, Some(call.arguments.clone())).await
    }

    /// List all registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records the input it was called with and echoes the "text" field.
    struct EchoTool {
        name: &'static str,
        seen: Arc<Mutex<Vec<serde_json::Value>>>,
    }

    impl EchoTool {
        fn named(name: &'static str) -> Self {
            Self {
                name,
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                }
            })
        }
        async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
            self.seen.lock().unwrap().push(arguments.clone());
            Ok(arguments["text"].as_str().unwrap_or("").to_string())
        }
    }

    fn registry_ab() -> ToolRegistry {
        ToolRegistry::new(vec![
            Box::new(EchoTool::named("A")),
            Box::new(EchoTool::named("B")),
        ])
        .unwrap()
    }

    #[test]
    fn empty_registry_is_a_config_error() {
        let err = ToolRegistry::new(vec![]).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = ToolRegistry::new(vec![
            Box::new(EchoTool::named("A")),
            Box::new(EchoTool::named("A")),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn definitions_keep_registration_order() {
        let registry = registry_ab();
        let names: Vec<_> = registry.definitions().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(registry.names(), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn unknown_tool_is_not_found() {
        let registry = registry_ab();
        let err = registry
            .execute("C", Some(serde_json::json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(ref n) if n == "C"));
    }

    #[tokio::test]
    async fn execute_passes_input_unchanged() {
        let echo = EchoTool::named("A");
        let seen = echo.seen.clone();
        let registry =
            ToolRegistry::new(vec![Box::new(echo), Box::new(EchoTool::named("B"))]).unwrap();

        let input = serde_json::json!({"text": "hello world", "extra": 3});
        let out = registry.execute("A", Some(input.clone())).await.unwrap();
        assert_eq!(out, "hello world");
        assert_eq!(*seen.lock().unwrap(), vec![input]);
    }

    #[tokio::test]
    async fn absent_input_defaults_to_empty_object() {
        let echo = EchoTool::named("A");
        let seen = echo.seen.clone();
        let registry = ToolRegistry::new(vec![Box::new(echo)]).unwrap();

        let out = registry.execute("A", None).await.unwrap();
        assert_eq!(out, "");
        assert_eq!(*seen.lock().unwrap(), vec![serde_json::json!({})]);
    }

    #[tokio::test]
    async fn execute_call_uses_parsed_arguments() {
        let registry = registry_ab();
        let call = ToolCall {
            id: "call_1".into(),
            name: "B".into(),
            arguments: serde_json::json!({"text": "via call"}),
        };
        assert_eq!(registry.execute_call(&call).await.unwrap(), "via call");
    }

    #[test]
    fn parse_object_arguments() {
        let raw = MessageToolCall {
            id: "call_0".into(),
            name: "A".into(),
            arguments: r#"{"x":1}"#.into(),
        };
        let call = ToolCall::parse(&raw).unwrap();
        assert_eq!(call.arguments, serde_json::json!({"x": 1}));
    }

    #[test]
    fn parse_blank_arguments_as_empty_object() {
        let raw = MessageToolCall {
            id: "call_0".into(),
            name: "calc".into(),
            arguments: "  ".into(),
        };
        let call = ToolCall::parse(&raw).unwrap();
        assert_eq!(call.arguments, serde_json::json!({}));
    }

    #[test]
    fn parse_malformed_arguments_is_invalid() {
        let raw = MessageToolCall {
            id: "call_0".into(),
            name: "calc".into(),
            arguments: r#"{"x":"#.into(),
        };
        let err = ToolCall::parse(&raw).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
        assert!(err.to_string().contains("calc"));
    }

    #[test]
    fn parse_non_object_arguments_is_invalid() {
        let raw = MessageToolCall {
            id: "call_0".into(),
            name: "calc".into(),
            arguments: "[1,2]".into(),
        };
        assert!(ToolCall::parse(&raw).is_err());
    }
}
