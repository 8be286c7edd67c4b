//! Agent-level streaming events.
//!
//! `AgentStreamEvent` describes the lifecycle of one run. Events reach an
//! optional [`StreamObserver`] in state-machine order:
//!
//! - `step_started`      — a new reasoning step begins
//! - `message_chunk`     — partial text from the model (streaming only)
//! - `message_completed` — the assistant turn is materialized
//! - `tool_call`         — the agent is invoking a tool
//! - `tool_result`       — the tool finished (or failed)
//! - `run_completed`     — a final answer was produced

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use webscout_core::message::MessageToolCall;

/// Events emitted by the agent during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStreamEvent {
    StepStarted { step: u32 },

    /// Partial text from the model.
    MessageChunk { step: u32, content: String },

    MessageCompleted {
        step: u32,
        text: String,
        trimmed: String,
        tool_calls: Vec<MessageToolCall>,
        is_final: bool,
    },

    /// The agent is calling a tool.
    ToolCall {
        step: u32,
        id: String,
        name: String,
        input: serde_json::Value,
    },

    /// Tool execution completed.
    ToolResult {
        step: u32,
        id: String,
        name: String,
        output: String,
        is_error: bool,
    },

    RunCompleted { answer: String, steps: u32 },
}

impl AgentStreamEvent {
    /// Wire name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::StepStarted { .. } => "step_started",
            Self::MessageChunk { .. } => "message_chunk",
            Self::MessageCompleted { .. } => "message_completed",
            Self::ToolCall { .. } => "tool_call",
            Self::ToolResult { .. } => "tool_result",
            Self::RunCompleted { .. } => "run_completed",
        }
    }
}

/// A side-channel sink for run events. Purely observational.
#[async_trait]
pub trait StreamObserver: Send + Sync {
    async fn on_event(&self, event: &AgentStreamEvent);
}

/// Forwards events into a tokio channel.
///
/// Events are dropped silently once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::Sender<AgentStreamEvent>,
}

impl ChannelObserver {
    pub fn new(tx: mpsc::Sender<AgentStreamEvent>) -> Self {
        Self { tx }
    }

    /// Create an observer together with its receiving end.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<AgentStreamEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl StreamObserver for ChannelObserver {
    async fn on_event(&self, event: &AgentStreamEvent) {
        let _ = self.tx.send(event.clone()).await;
    }
}
