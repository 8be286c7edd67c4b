//! Completion stream collector.
//!
//! Reduces the fragments of one streamed completion into a single
//! [`AssistantTurn`]. Tool-call deltas are grouped by their positional index
//! within the response and materialized in ascending index order once the
//! stream ends.

use async_trait::async_trait;
use std::collections::BTreeMap;
use webscout_core::error::ProviderError;
use webscout_core::message::{Message, MessageToolCall};
use webscout_core::provider::{ChunkReceiver, ProviderResponse, StreamChunk, ToolCallDelta, Usage};

/// Receives content text as it arrives.
#[async_trait]
pub trait ChunkSink: Send + Sync {
    /// Called once per content fragment with exactly the new slice.
    async fn on_chunk(&self, delta: &str);
}

/// One materialized assistant turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssistantTurn {
    pub text: String,

    /// Raw tool-call records in model order; arguments are unparsed text.
    pub tool_calls: Vec<MessageToolCall>,

    pub usage: Option<Usage>,
}

impl AssistantTurn {
    /// A turn without tool calls ends the run.
    pub fn is_terminal(&self) -> bool {
        self.tool_calls.is_empty()
    }

    /// The conversation message echoing this turn verbatim.
    pub fn to_message(&self) -> Message {
        Message::assistant_with_tools(self.text.clone(), self.tool_calls.clone())
    }
}

#[derive(Debug, Default)]
struct ToolSlot {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

impl ToolSlot {
    fn apply(&mut self, delta: &ToolCallDelta) {
        set_once(&mut self.id, &delta.id);
        set_once(&mut self.name, &delta.name);
        if let Some(fragment) = &delta.arguments {
            self.arguments.push_str(fragment);
        }
    }

    fn into_call(self, index: u32) -> MessageToolCall {
        MessageToolCall {
            id: self.id.unwrap_or_else(|| synthetic_id(index)),
            name: self.name.unwrap_or_default(),
            arguments: self.arguments,
        }
    }
}

fn set_once(field: &mut Option<String>, value: &Option<String>) {
    if field.is_none()
        && let Some(v) = value
        && !v.is_empty()
    {
        *field = Some(v.clone());
    }
}

fn synthetic_id(index: u32) -> String {
    format!("call_{index}")
}

/// Incremental accumulator for one completion.
#[derive(Debug, Default)]
pub struct StreamCollector {
    text: String,
    slots: BTreeMap<u32, ToolSlot>,
    usage: Option<Usage>,
}

impl StreamCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one fragment in. Returns the newly arrived content slice, if any.
    pub fn push<'c>(&mut self, chunk: &'c StreamChunk) -> Option<&'c str> {
        for delta in &chunk.tool_calls {
            self.slots.entry(delta.index).or_default().apply(delta);
        }
        if chunk.usage.is_some() {
            self.usage = chunk.usage;
        }

        let content = chunk.content.as_deref().filter(|c| !c.is_empty())?;
        self.text.push_str(content);
        Some(content)
    }

    /// Materialize the turn.
    pub fn finish(self) -> AssistantTurn {
        AssistantTurn {
            text: self.text,
            tool_calls: self
                .slots
                .into_iter()
                .map(|(index, slot)| slot.into_call(index))
                .collect(),
            usage: self.usage,
        }
    }
}

/// Drain `rx` into one turn, forwarding each content slice to `sink`.
///
/// Stops at a `done` fragment or when the channel closes. A transport error
/// fragment aborts collection.
pub async fn collect_stream(
    mut rx: ChunkReceiver,
    sink: Option<&dyn ChunkSink>,
) -> Result<AssistantTurn, ProviderError> {
    let mut collector = StreamCollector::new();

    while let Some(item) = rx.recv().await {
        let chunk = item?;
        if let Some(delta) = collector.push(&chunk)
            && let Some(sink) = sink
        {
            sink.on_chunk(delta).await;
        }
        if chunk.done {
            break;
        }
    }

    Ok(collector.finish())
}

/// Populate a turn from one complete (non-streaming) response.
pub fn from_response(response: ProviderResponse) -> AssistantTurn {
    let message = response.message;
    AssistantTurn {
        text: message.content,
        tool_calls: message
            .tool_calls
            .into_iter()
            .enumerate()
            .map(|(i, mut call)| {
                if call.id.is_empty() {
                    call.id = synthetic_id(i as u32);
                }
                call
            })
            .collect(),
        usage: response.usage,
    }
}
