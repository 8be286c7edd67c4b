//! ReAct pattern — Thought → Action → Observation loop.
//!
//! The agent reasons step-by-step, choosing tools to gather information,
//! then synthesizes a final answer.
//!
//! # Step protocol
//!
//! Each step asks the model for one turn over the whole conversation. A turn
//! without tool calls is the answer. Otherwise every requested call runs in
//! model order and its result (or an error payload) is appended before the
//! next step. Tool failures are conversation content; only transport errors
//! and the step budget end a run early.
//!
//! # Trace Format
//!
//! With `debug` set, the run also returns a flat transcript:
//! - `Thought: ...` for a tool-calling turn's text
//! - `Action: <tool> <input>` per call
//! - the formatted result, or `Error: <payload>`
//! - `Final Answer: ...`

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use webscout_config::AppConfig;
use webscout_core::error::{Error, ToolError};
use webscout_core::message::{Conversation, Message, MessageToolCall};
use webscout_core::provider::{Provider, ProviderRequest};
use webscout_core::tool::{ToolCall, ToolRegistry, ToolResult};

use crate::collector::{self, AssistantTurn, ChunkSink};
use crate::stream_event::{AgentStreamEvent, StreamObserver};
use crate::transcript::Transcript;

/// System prompt used when the configuration does not override it.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are WebScout, a careful research assistant.
Answer the user's question using the tools available to you.

- Use web_search to find candidate sources, then fetch_page to read the most relevant ones.
- Think briefly before each tool call and say what you are looking for.
- If a tool returns an error, adjust your approach instead of repeating the same call.
- When you have enough information, reply with the final answer only, without calling tools.
- Cite the URLs you relied on.";

/// A ReAct agent bound to one provider and one tool registry.
pub struct ReactAgent {
    /// LLM provider.
    provider: Arc<dyn Provider>,
    /// Model name.
    model: String,
    temperature: f32,
    /// Max tokens per response.
    max_tokens: Option<u32>,
    top_p: Option<f32>,
    top_k: Option<u32>,
    /// Tool registry.
    tools: Arc<ToolRegistry>,
    system_prompt: String,
    /// Maximum reasoning steps.
    max_steps: u32,
    /// Request streamed responses.
    streaming: bool,
}

/// Per-run options.
#[derive(Clone, Copy, Default)]
pub struct RunOptions<'a> {
    /// Capture a transcript of the run.
    pub debug: bool,
    pub observer: Option<&'a dyn StreamObserver>,
}

impl<'a> RunOptions<'a> {
    pub fn debug() -> Self {
        Self {
            debug: true,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: &'a dyn StreamObserver) -> Self {
        self.observer = Some(observer);
        self
    }
}

/// The result of a ReAct run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunOutput {
    /// The final answer text, trimmed.
    pub answer: String,
    /// Present iff the run was started with `debug`.
    pub transcript: Option<Vec<String>>,
    /// Number of steps used.
    pub steps: u32,
}

/// Forwards collector content slices to the observer as `message_chunk`.
struct ChunkForwarder<'a> {
    observer: &'a dyn StreamObserver,
    step: u32,
}

#[async_trait::async_trait]
impl<'a> ChunkSink for ChunkForwarder<'a> {
    async fn on_chunk(&self, delta: &str) {
        self.observer
            .on_event(&AgentStreamEvent::MessageChunk {
                step: self.step,
                content: delta.to_string(),
            })
            .await;
    }
}

impl ReactAgent {
    /// Create a new ReAct agent.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.2,
            max_tokens: None,
            top_p: None,
            top_k: None,
            tools,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_steps: 6,
            streaming: true,
        }
    }

    /// Build an agent from the application configuration.
    pub fn from_config(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        config: &AppConfig,
    ) -> Self {
        let mut agent = Self::new(provider, config.model.clone(), tools)
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens)
            .with_max_steps(config.max_steps)
            .with_streaming(config.stream);
        agent.top_p = config.top_p;
        agent.top_k = config.top_k;
        if let Some(prompt) = &config.system_prompt {
            agent.system_prompt = prompt.clone();
        }
        agent
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the max tokens per LLM response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Set max reasoning steps.
    pub fn with_max_steps(mut self, max: u32) -> Self {
        self.max_steps = max;
        self
    }

    pub fn with_streaming(mut self, enabled: bool) -> Self {
        self.streaming = enabled;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    /// Execute the ReAct loop for `query`.
    pub async fn run(&self, query: &str, options: RunOptions<'_>) -> Result<RunOutput, Error> {
        let observer = options.observer;
        let mut transcript = options.debug.then(Transcript::new);
        let mut conversation = Conversation::seeded(&self.system_prompt, query);

        info!(
            model = %self.model,
            max_steps = self.max_steps,
            streaming = self.streaming,
            conversation = %conversation.id,
            "ReAct run starting"
        );

        for step in 1..=self.max_steps {
            debug!(step, "ReAct step");
            notify(observer, AgentStreamEvent::StepStarted { step }).await;

            let turn = self.request_turn(&conversation, step, observer).await?;
            conversation.push(turn.to_message());

            let trimmed = turn.text.trim().to_string();
            notify(
                observer,
                AgentStreamEvent::MessageCompleted {
                    step,
                    text: turn.text.clone(),
                    trimmed: trimmed.clone(),
                    tool_calls: turn.tool_calls.clone(),
                    is_final: turn.is_terminal(),
                },
            )
            .await;

            if turn.is_terminal() {
                if let Some(t) = transcript.as_mut() {
                    t.final_answer(&trimmed);
                }
                notify(
                    observer,
                    AgentStreamEvent::RunCompleted {
                        answer: trimmed.clone(),
                        steps: step,
                    },
                )
                .await;

                info!(steps = step, "ReAct run completed");
                return Ok(RunOutput {
                    answer: trimmed,
                    transcript: transcript.map(Transcript::into_records),
                    steps: step,
                });
            }

            if let Some(t) = transcript.as_mut() {
                t.thought(&trimmed);
            }

            for raw in &turn.tool_calls {
                self.run_tool_call(raw, step, &mut conversation, observer, transcript.as_mut())
                    .await;
            }
        }

        warn!(max_steps = self.max_steps, "ReAct step budget exhausted");
        Err(Error::StepBudgetExhausted {
            max_steps: self.max_steps,
        })
    }

    /// Ask the provider for one assistant turn.
    async fn request_turn(
        &self,
        conversation: &Conversation,
        step: u32,
        observer: Option<&dyn StreamObserver>,
    ) -> Result<AssistantTurn, Error> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: conversation.messages.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
            top_k: self.top_k,
            tools: self.tools.definitions().to_vec(),
            stream: self.streaming,
        };

        let turn = if self.streaming {
            let rx = self.provider.stream(request).await?;
            let forwarder = observer.map(|observer| ChunkForwarder { observer, step });
            collector::collect_stream(rx, forwarder.as_ref().map(|f| f as &dyn ChunkSink)).await?
        } else {
            collector::from_response(self.provider.complete(request).await?)
        };

        debug!(
            step,
            text_len = turn.text.len(),
            tool_calls = turn.tool_calls.len(),
            "Assistant turn collected"
        );
        Ok(turn)
    }

    /// Run one tool call inside the recoverable region.
    ///
    /// Parsing, lookup and execution failures all become an error payload.
    /// The tool turn is appended before `tool_result` is emitted.
    async fn run_tool_call(
        &self,
        raw: &MessageToolCall,
        step: u32,
        conversation: &mut Conversation,
        observer: Option<&dyn StreamObserver>,
        transcript: Option<&mut Transcript>,
    ) {
        let parsed = ToolCall::parse(raw);
        let input = match &parsed {
            Ok(call) => call.arguments.clone(),
            Err(_) => serde_json::Value::String(raw.arguments.clone()),
        };

        notify(
            observer,
            AgentStreamEvent::ToolCall {
                step,
                id: raw.id.clone(),
                name: raw.name.clone(),
                input: input.clone(),
            },
        )
        .await;

        let outcome = match parsed {
            Ok(call) => self.tools.execute_call(&call).await,
            Err(e) => Err(e),
        };

        let result = match outcome {
            Ok(output) => ToolResult {
                call_id: raw.id.clone(),
                name: raw.name.clone(),
                output,
                is_error: false,
            },
            Err(e) => {
                warn!(tool = %raw.name, error = %e, "Tool call failed");
                ToolResult {
                    call_id: raw.id.clone(),
                    name: raw.name.clone(),
                    output: error_payload(&raw.name, &e),
                    is_error: true,
                }
            }
        };

        if let Some(t) = transcript {
            let shown = match &input {
                serde_json::Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            t.action(&raw.name, &shown);
            if result.is_error {
                t.error(&result.output);
            } else {
                t.result(&result.output);
            }
        }

        conversation.push(Message::tool_result(&result.call_id, &result.output));

        notify(
            observer,
            AgentStreamEvent::ToolResult {
                step,
                id: result.call_id,
                name: result.name,
                output: result.output,
                is_error: result.is_error,
            },
        )
        .await;
    }
}

/// The text a failed tool call contributes to the conversation.
pub fn error_payload(tool: &str, error: &ToolError) -> String {
    serde_json::json!({
        "error": {
            "tool": tool,
            "message": error.to_string(),
        }
    })
    .to_string()
}

async fn notify(observer: Option<&dyn StreamObserver>, event: AgentStreamEvent) {
    if let Some(observer) = observer {
        observer.on_event(&event).await;
    }
}
