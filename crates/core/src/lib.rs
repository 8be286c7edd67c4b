//! # WebScout Core
//!
//! Domain types, traits, and error definitions for the WebScout research
//! agent. This crate has **no transport dependencies**: it defines the
//! conversation model, the provider seam and the tool contract that every
//! other crate implements against.
//!
//! ## Design Philosophy
//!
//! Each external collaborator is a trait here. Implementations live in their
//! respective crates, so tests can swap in scripted providers and stub tools
//! without touching the run loop.

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, ToolError};
pub use message::{Conversation, ConversationId, Message, MessageToolCall, Role};
pub use provider::{
    ChunkReceiver, Provider, ProviderRequest, ProviderResponse, StreamChunk, ToolCallDelta,
    ToolDefinition, Usage,
};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
