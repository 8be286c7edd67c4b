//! Tag extraction for grader replies.
//!
//! Expected shape (but never required):
//!
//! ```text
//! <evaluation>
//!   <verdict>Good</verdict>
//!   <score>4</score>
//!   <reasoning>...</reasoning>
//!   <improvements>...</improvements>
//! </evaluation>
//! ```

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// A parsed grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Free-form verdict; `"unknown"` when the grader gave none.
    pub verdict: String,
    /// 1..=5, or 0 when no score could be read.
    pub score: u8,
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improvements: Option<String>,
}

/// Contents of `<tag>...</tag>` (first match, case-insensitive, spanning
/// lines). `<tag/>` counts as present and empty.
fn extract_tag(text: &str, tag: &str) -> Option<String> {
    let pattern = format!(r"(?is)<{tag}\s*>(.*?)</{tag}\s*>|<{tag}\s*/>");
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(text)?;
    Some(caps.get(1).map_or("", |m| m.as_str()).trim().to_string())
}

fn parse_score(raw: Option<&str>) -> u8 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .map_or(0, |n| n.clamp(1.0, 5.0).round() as u8)
}

/// Parse a grader reply. Never fails.
pub fn parse_evaluation(text: &str) -> EvaluationResult {
    let score = extract_tag(text, "score");
    EvaluationResult {
        verdict: extract_tag(text, "verdict").unwrap_or_else(|| "unknown".into()),
        score: parse_score(score.as_deref()),
        reasoning: extract_tag(text, "reasoning").unwrap_or_default(),
        improvements: extract_tag(text, "improvements").filter(|s| !s.is_empty()),
    }
}
