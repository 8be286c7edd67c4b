//! Live progress printer for `webscout ask`.

use async_trait::async_trait;
use std::io::Write;
use std::sync::Mutex;
use webscout_agent::{AgentStreamEvent, StreamObserver};

const PREVIEW_CHARS: usize = 160;

struct State<W> {
    out: W,
    /// Streamed text is pending on the current line.
    mid_line: bool,
}

/// Prints run events as they happen.
///
/// Write errors are ignored; progress output must never fail a run.
pub struct ConsoleObserver<W: Write + Send> {
    state: Mutex<State<W>>,
}

impl ConsoleObserver<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write + Send> ConsoleObserver<W> {
    pub fn new(out: W) -> Self {
        Self {
            state: Mutex::new(State {
                out,
                mid_line: false,
            }),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        match self.state.into_inner() {
            Ok(state) => state.out,
            Err(poisoned) => poisoned.into_inner().out,
        }
    }

    fn print(&self, event: &AgentStreamEvent) {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let state = &mut *guard;

        if let AgentStreamEvent::MessageChunk { content, .. } = event {
            let _ = write!(state.out, "{content}");
            let _ = state.out.flush();
            state.mid_line = true;
            return;
        }

        if state.mid_line {
            let _ = writeln!(state.out);
            state.mid_line = false;
        }

        let _ = match event {
            AgentStreamEvent::StepStarted { step } => writeln!(state.out, "  [step {step}]"),
            AgentStreamEvent::ToolCall { name, input, .. } => {
                writeln!(state.out, "  -> {name} {}", preview(&input.to_string()))
            }
            AgentStreamEvent::ToolResult {
                name,
                output,
                is_error: true,
                ..
            } => writeln!(state.out, "  !! {name} failed: {}", preview(output)),
            AgentStreamEvent::ToolResult { name, output, .. } => {
                writeln!(state.out, "  <- {name} ({} chars)", output.chars().count())
            }
            AgentStreamEvent::RunCompleted { steps, .. } => {
                writeln!(state.out, "  [done after {steps} step(s)]")
            }
            AgentStreamEvent::MessageCompleted { .. } | AgentStreamEvent::MessageChunk { .. } => {
                Ok(())
            }
        };
        let _ = state.out.flush();
    }
}

fn preview(text: &str) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
    format!("{cut}…")
}

#[async_trait]
impl<W: Write + Send> StreamObserver for ConsoleObserver<W> {
    async fn on_event(&self, event: &AgentStreamEvent) {
        self.print(event);
    }
}
