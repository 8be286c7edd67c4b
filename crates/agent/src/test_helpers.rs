//! Shared test helpers for run-loop tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use webscout_core::error::{ProviderError, ToolError};
use webscout_core::message::{Message, MessageToolCall};
use webscout_core::provider::{
    ChunkReceiver, Provider, ProviderRequest, ProviderResponse, StreamChunk, ToolCallDelta, Usage,
};
use webscout_core::tool::Tool;

/// One scripted provider turn.
pub enum Scripted {
    /// Answered by `complete`, or replayed as fragments by `stream`.
    Respond(ProviderResponse),
    /// Raw fragments for `stream`.
    Chunks(Vec<Result<StreamChunk, ProviderError>>),
    Fail(ProviderError),
}

/// A mock provider that returns a sequence of scripted turns.
///
/// Panics if more calls are made than turns provided, unless a repeating
/// response was set.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Scripted>>,
    repeat: Option<ProviderResponse>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            repeat: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn responses(responses: Vec<ProviderResponse>) -> Self {
        Self::new(responses.into_iter().map(Scripted::Respond).collect())
    }

    /// Returns the same response forever.
    pub fn repeating(response: ProviderResponse) -> Self {
        Self {
            repeat: Some(response),
            ..Self::new(vec![])
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next(&self, request: ProviderRequest) -> Scripted {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len()
        };
        match self.script.lock().unwrap().pop_front() {
            Some(step) => step,
            None => match &self.repeat {
                Some(response) => Scripted::Respond(response.clone()),
                None => panic!("ScriptedProvider: no more responses (call #{call})"),
            },
        }
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        match self.next(request) {
            Scripted::Respond(response) => Ok(response),
            Scripted::Fail(e) => Err(e),
            Scripted::Chunks(_) => panic!("ScriptedProvider: chunk script used by complete()"),
        }
    }

    async fn stream(&self, request: ProviderRequest) -> Result<ChunkReceiver, ProviderError> {
        let items = match self.next(request) {
            Scripted::Respond(response) => replay(response),
            Scripted::Chunks(items) => items,
            Scripted::Fail(e) => return Err(e),
        };
        let (tx, rx) = tokio::sync::mpsc::channel(items.len().max(1));
        for item in items {
            tx.try_send(item).unwrap();
        }
        Ok(rx)
    }
}

fn replay(response: ProviderResponse) -> Vec<Result<StreamChunk, ProviderError>> {
    let mut items = Vec::new();
    if !response.message.content.is_empty() {
        items.push(Ok(StreamChunk::text(response.message.content.clone())));
    }
    let deltas: Vec<_> = response
        .message
        .tool_calls
        .iter()
        .enumerate()
        .map(|(i, tc)| ToolCallDelta::complete(i as u32, tc))
        .collect();
    if !deltas.is_empty() {
        items.push(Ok(StreamChunk::tool_deltas(deltas)));
    }
    items.push(Ok(StreamChunk::finished(response.usage)));
    items
}

fn usage() -> Option<Usage> {
    Some(Usage {
        prompt_tokens: 10,
        completion_tokens: 5,
        total_tokens: 15,
    })
}

/// Create a simple text response (no tool calls).
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: usage(),
        model: "mock-model".into(),
    }
}

/// Create a response with tool calls and optional thought content.
pub fn make_tool_call_response(tool_calls: Vec<MessageToolCall>, thought: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant_with_tools(thought, tool_calls),
        usage: usage(),
        model: "mock-model".into(),
    }
}

/// Helper to create a tool call.
pub fn make_tool_call(name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}

/// A tool with a fixed reply that records every input it receives.
pub struct StubTool {
    name: &'static str,
    reply: Result<String, ToolError>,
    pub seen: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl StubTool {
    pub fn ok(name: &'static str, output: &str) -> Self {
        Self {
            name,
            reply: Ok(output.to_string()),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(name: &'static str, reason: &str) -> Self {
        Self {
            name,
            reply: Err(ToolError::ExecutionFailed {
                tool_name: name.to_string(),
                reason: reason.to_string(),
            }),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl Tool for StubTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Stub tool for tests"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object"})
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        self.seen.lock().unwrap().push(arguments);
        self.reply.clone()
    }
}
