//! End-to-end integration tests for WebScout.
//!
//! These tests exercise the full pipeline from query to answer: the run
//! loop, tool dispatch, stream collection, observer events and grading.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use webscout_agent::{AgentStreamEvent, ChannelObserver, ReactAgent, RunOptions};
use webscout_config::ToolsConfig;
use webscout_core::error::{Error, ProviderError, ToolError};
use webscout_core::message::{Message, MessageToolCall, Role};
use webscout_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use webscout_core::tool::{Tool, ToolRegistry};
use webscout_eval::{EvaluationRequest, Evaluator};
use webscout_providers::OpenAiCompatProvider;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Mock Provider ────────────────────────────────────────────────────────

/// A mock provider that returns scripted responses in sequence.
struct ScriptedProvider {
    responses: Vec<ProviderResponse>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let count = requests.len();
        requests.push(request);
        match self.responses.get(count) {
            Some(response) => Ok(response.clone()),
            None => panic!(
                "ScriptedProvider exhausted: call #{}, have {}",
                count + 1,
                self.responses.len()
            ),
        }
    }
}

fn usage() -> Option<Usage> {
    Some(Usage {
        prompt_tokens: 10,
        completion_tokens: 5,
        total_tokens: 15,
    })
}

fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: usage(),
        model: "mock".into(),
    }
}

fn tool_response(tool_calls: Vec<MessageToolCall>, thought: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant_with_tools(thought, tool_calls),
        usage: usage(),
        model: "mock".into(),
    }
}

fn make_tool_call(name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}

// ── Stub Tools ───────────────────────────────────────────────────────────

/// Evaluates nothing; always answers "4".
struct CalcTool;

#[async_trait]
impl Tool for CalcTool {
    fn name(&self) -> &str {
        "calc"
    }

    fn description(&self) -> &str {
        "Evaluate an arithmetic expression"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {"expression": {"type": "string"}},
            "required": ["expression"]
        })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<String, ToolError> {
        Ok("4".into())
    }
}

struct BrokenTool;

#[async_trait]
impl Tool for BrokenTool {
    fn name(&self) -> &str {
        "broken"
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object"})
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<String, ToolError> {
        Err(ToolError::ExecutionFailed {
            tool_name: "broken".into(),
            reason: "disk on fire".into(),
        })
    }
}

fn calc_registry() -> Arc<ToolRegistry> {
    Arc::new(ToolRegistry::new(vec![Box::new(CalcTool)]).unwrap())
}

fn drain(mut rx: tokio::sync::mpsc::Receiver<AgentStreamEvent>) -> Vec<AgentStreamEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// ── E2E: Full ReAct Pipeline ─────────────────────────────────────────────

#[tokio::test]
async fn e2e_what_is_two_plus_two() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_response(
            vec![make_tool_call("calc", serde_json::json!({"expression": "2+2"}))],
            "I should calculate this.",
        ),
        text_response("The answer is 4."),
    ]));
    let agent = ReactAgent::new(provider.clone(), "mock", calc_registry());

    let output = agent
        .run("what is 2+2", RunOptions::debug())
        .await
        .expect("run should succeed");

    assert_eq!(output.answer, "The answer is 4.");
    assert_eq!(output.steps, 2);
    assert_eq!(provider.calls(), 2);

    let transcript = output.transcript.expect("debug run keeps a transcript");
    assert!(transcript.iter().any(|r| r.starts_with("Action: calc")));
    assert!(transcript.iter().any(|r| r == "4"));
    assert_eq!(transcript.last().unwrap(), "Final Answer: The answer is 4.");

    // Second request carries the tool result back to the model.
    let second = &provider.requests.lock().unwrap()[1];
    let tool_turn = second.messages.last().unwrap();
    assert_eq!(tool_turn.role, Role::Tool);
    assert_eq!(tool_turn.content, "4");
    assert_eq!(tool_turn.tool_call_id.as_deref(), Some("call_calc"));
}

#[tokio::test]
async fn e2e_non_debug_run_has_no_transcript() {
    let provider = Arc::new(ScriptedProvider::new(vec![text_response("  Paris.  ")]));
    let agent = ReactAgent::new(provider, "mock", calc_registry());

    let output = agent.run("capital of France?", RunOptions::default()).await.unwrap();
    assert_eq!(output.answer, "Paris.");
    assert_eq!(output.transcript, None);
    assert_eq!(output.steps, 1);
}

#[tokio::test]
async fn e2e_failing_tool_is_reported_to_the_model() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_response(vec![make_tool_call("broken", serde_json::json!({}))], ""),
        text_response("I could not read it."),
    ]));
    let tools = Arc::new(ToolRegistry::new(vec![Box::new(BrokenTool), Box::new(CalcTool)]).unwrap());
    let agent = ReactAgent::new(provider.clone(), "mock", tools);

    let output = agent.run("read it", RunOptions::debug()).await.unwrap();
    assert_eq!(output.answer, "I could not read it.");

    let second = &provider.requests.lock().unwrap()[1];
    let payload: serde_json::Value =
        serde_json::from_str(&second.messages.last().unwrap().content).unwrap();
    assert_eq!(payload["error"]["tool"], "broken");
    assert!(payload["error"]["message"].as_str().unwrap().contains("disk on fire"));

    let transcript = output.transcript.unwrap();
    assert!(transcript.iter().any(|r| r.starts_with("Error: ")));
}

#[tokio::test]
async fn e2e_step_budget_is_enforced() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_response(vec![make_tool_call("calc", serde_json::json!({}))], ""),
        tool_response(vec![make_tool_call("calc", serde_json::json!({}))], ""),
        tool_response(vec![make_tool_call("calc", serde_json::json!({}))], ""),
    ]));
    let agent = ReactAgent::new(provider.clone(), "mock", calc_registry()).with_max_steps(2);

    let err = agent.run("loop forever", RunOptions::default()).await.unwrap_err();
    assert!(matches!(err, Error::StepBudgetExhausted { max_steps: 2 }));
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn e2e_observer_sees_the_whole_run() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_response(vec![make_tool_call("calc", serde_json::json!({"expression": "2+2"}))], ""),
        text_response("4"),
    ]));
    let agent = ReactAgent::new(provider, "mock", calc_registry());
    let (observer, rx) = ChannelObserver::channel(64);

    agent
        .run("what is 2+2", RunOptions::default().with_observer(&observer))
        .await
        .unwrap();

    let kinds: Vec<_> = drain(rx).iter().map(|e| e.event_type()).collect();
    assert_eq!(
        kinds,
        vec![
            "step_started",
            "message_completed",
            "tool_call",
            "tool_result",
            "step_started",
            "message_chunk",
            "message_completed",
            "run_completed",
        ]
    );
}

// ── E2E: Real transport against a local server ───────────────────────────

fn sse(events: &[serde_json::Value]) -> String {
    let mut body = String::new();
    for event in events {
        body.push_str(&format!("data: {event}\n\n"));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

#[tokio::test]
async fn e2e_streamed_run_over_http_with_fetch_page() {
    let server = MockServer::start().await;
    let page_url = format!("{}/article", server.uri());

    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><body><p>Ferris is the Rust mascot.</p></body></html>",
            "text/html",
        ))
        .mount(&server)
        .await;

    // First turn: a streamed fetch_page call split across two fragments.
    let args = serde_json::json!({"url": page_url}).to_string();
    let (head, tail) = args.split_at(args.len() / 2);
    let first = sse(&[
        serde_json::json!({"choices": [{"delta": {"content": "Reading the page."}}]}),
        serde_json::json!({"choices": [{"delta": {"tool_calls": [{
            "index": 0, "id": "call_a", "type": "function",
            "function": {"name": "fetch_page", "arguments": head}
        }]}}]}),
        serde_json::json!({"choices": [{"delta": {"tool_calls": [{
            "index": 0, "function": {"arguments": tail}
        }]}}]}),
    ]);
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(first, "text/event-stream"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let second = sse(&[
        serde_json::json!({"choices": [{"delta": {"content": "Ferris is "}}]}),
        serde_json::json!({"choices": [{"delta": {"content": "the mascot."}}]}),
    ]);
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(second, "text/event-stream"))
        .mount(&server)
        .await;

    let provider = Arc::new(OpenAiCompatProvider::new("local", server.uri(), "sk-test").unwrap());
    let tools = Arc::new(webscout_tools::default_registry(&ToolsConfig::default()).unwrap());
    let agent = ReactAgent::new(provider, "mock", tools);
    let (observer, rx) = ChannelObserver::channel(64);

    let output = agent
        .run(
            "who is Ferris?",
            RunOptions::debug().with_observer(&observer),
        )
        .await
        .unwrap();

    assert_eq!(output.answer, "Ferris is the mascot.");
    assert_eq!(output.steps, 2);

    let transcript = output.transcript.unwrap();
    assert_eq!(transcript[0], "Thought: Reading the page.");
    assert!(transcript[1].starts_with("Action: fetch_page"));
    assert!(transcript[2].contains("Ferris is the Rust mascot."));

    let events = drain(rx);
    let results: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            AgentStreamEvent::ToolResult { id, is_error, .. } => Some((id.clone(), *is_error)),
            _ => None,
        })
        .collect();
    assert_eq!(results, vec![("call_a".to_string(), false)]);

    let chunks: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            AgentStreamEvent::MessageChunk { step: 2, content } => Some(content.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(chunks, vec!["Ferris is ", "the mascot."]);
}

// ── E2E: Grading ─────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_answer_then_grade() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        text_response("The answer is 4."),
        text_response(
            "<evaluation><verdict>Correct</verdict><score>5</score>\
             <reasoning>Exact.</reasoning><improvements></improvements></evaluation>",
        ),
    ]));
    let agent = ReactAgent::new(provider.clone(), "mock", calc_registry());
    let output = agent.run("what is 2+2", RunOptions::default()).await.unwrap();

    let evaluator = Evaluator::new(provider.clone(), "grader");
    let grade = evaluator
        .evaluate(&EvaluationRequest::new("what is 2+2", &output.answer))
        .await
        .unwrap();

    assert_eq!(grade.verdict, "Correct");
    assert_eq!(grade.score, 5);
    assert_eq!(grade.reasoning, "Exact.");
    assert_eq!(grade.improvements, None);

    let grading_request = &provider.requests.lock().unwrap()[1];
    assert!(!grading_request.stream);
    assert!(grading_request.tools.is_empty());
    assert!(grading_request.messages[1].content.contains("Answer:\nThe answer is 4."));
}
