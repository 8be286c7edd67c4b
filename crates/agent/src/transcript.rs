//! Debug transcript of a run: flat, ordered, human-readable records.

/// Tool results longer than this are cut in the transcript.
pub const MAX_RESULT_CHARS: usize = 1200;

const TRUNCATION_MARKER: &str = "...(truncated)";

#[derive(Debug, Default, Clone)]
pub struct Transcript {
    records: Vec<String>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn thought(&mut self, text: &str) {
        if !text.is_empty() {
            self.records.push(format!("Thought: {text}"));
        }
    }

    pub fn action(&mut self, tool: &str, input: &str) {
        self.records.push(format!("Action: {tool} {input}"));
    }

    pub fn result(&mut self, output: &str) {
        self.records.push(format_result(output));
    }

    pub fn error(&mut self, payload: &str) {
        self.records.push(format!("Error: {}", truncate(payload)));
    }

    pub fn final_answer(&mut self, answer: &str) {
        self.records.push(format!("Final Answer: {answer}"));
    }

    pub fn into_records(self) -> Vec<String> {
        self.records
    }
}

/// Pretty-print JSON output, pass other text through, then truncate.
pub fn format_result(output: &str) -> String {
    let formatted = serde_json::from_str::<serde_json::Value>(output)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
        .unwrap_or_else(|| output.to_string());
    truncate(&formatted)
}

fn truncate(text: &str) -> String {
    match text.char_indices().nth(MAX_RESULT_CHARS) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &text[..cut]),
        None => text.to_string(),
    }
}
