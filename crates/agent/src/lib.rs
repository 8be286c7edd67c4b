//! The ReAct run loop — the heart of WebScout.
//!
//! The agent follows a **Thought → Action → Observation** cycle:
//!
//! 1. **Seed** a conversation with the system prompt and the user query
//! 2. **Ask** the provider for one assistant turn (streamed or not)
//! 3. **If tool calls**: execute them in order, append results, loop to 2
//! 4. **If text only**: that text is the answer
//!
//! The loop ends with an answer or when the step budget is spent.

pub mod collector;
pub mod react;
pub mod stream_event;
pub mod transcript;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use collector::{AssistantTurn, ChunkSink, StreamCollector, collect_stream};
pub use react::{DEFAULT_SYSTEM_PROMPT, ReactAgent, RunOptions, RunOutput};
pub use stream_event::{AgentStreamEvent, ChannelObserver, StreamObserver};
