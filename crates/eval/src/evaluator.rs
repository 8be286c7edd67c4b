//! The grading call.

use std::sync::Arc;
use tracing::{debug, info};
use webscout_config::AppConfig;
use webscout_core::error::Error;
use webscout_core::message::Message;
use webscout_core::provider::{Provider, ProviderRequest};

use crate::parse::{EvaluationResult, parse_evaluation};

/// Rubric used when the caller does not supply one.
pub const DEFAULT_RUBRIC: &str = "\
Score the answer from 1 (unusable) to 5 (excellent) considering:
- Correctness: claims are accurate and consistent with the references, if any.
- Completeness: the question is fully addressed.
- Grounding: sources are cited where facts are asserted.
- Clarity: the answer is concise and well organised.";

const SYSTEM_PROMPT: &str = "\
You are a strict grader of research answers. Judge the answer against the rubric.
Reply with exactly this structure and nothing else:
<evaluation>
<verdict>one or two words</verdict>
<score>integer from 1 to 5</score>
<reasoning>a short justification</reasoning>
<improvements>concrete suggestions, or leave empty</improvements>
</evaluation>";

const DEFAULT_MAX_TOKENS: u32 = 512;

/// What to grade.
#[derive(Debug, Clone, Default)]
pub struct EvaluationRequest {
    pub query: String,
    pub answer: String,
    pub rubric: Option<String>,
    pub references: Vec<String>,
}

impl EvaluationRequest {
    pub fn new(query: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            answer: answer.into(),
            ..Self::default()
        }
    }

    pub fn with_rubric(mut self, rubric: impl Into<String>) -> Self {
        self.rubric = Some(rubric.into());
        self
    }

    pub fn with_references(mut self, references: Vec<String>) -> Self {
        self.references = references;
        self
    }

    /// The labeled user turn sent to the grader.
    fn render(&self) -> String {
        let rubric = self.rubric.as_deref().unwrap_or(DEFAULT_RUBRIC);
        let mut prompt = format!(
            "Rubric:\n{rubric}\n\nQuestion:\n{}\n\nAnswer:\n{}",
            self.query, self.answer
        );
        if !self.references.is_empty() {
            prompt.push_str("\n\nReferences:");
            for reference in &self.references {
                prompt.push_str("\n- ");
                prompt.push_str(reference);
            }
        }
        prompt
    }
}

/// Grades answers with one deterministic completion call.
pub struct Evaluator {
    provider: Arc<dyn Provider>,
    model: String,
    max_tokens: u32,
}

impl Evaluator {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn from_config(provider: Arc<dyn Provider>, config: &AppConfig) -> Self {
        Self::new(provider, config.evaluator_model()).with_max_tokens(config.evaluator.max_tokens)
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = max;
        self
    }

    /// Grade one answer. Only transport failures are errors.
    pub async fn evaluate(&self, request: &EvaluationRequest) -> Result<EvaluationResult, Error> {
        let provider_request = ProviderRequest {
            model: self.model.clone(),
            messages: vec![Message::system(SYSTEM_PROMPT), Message::user(request.render())],
            temperature: 0.0,
            max_tokens: Some(self.max_tokens),
            top_p: None,
            top_k: None,
            tools: vec![],
            stream: false,
        };

        debug!(model = %self.model, "Requesting evaluation");
        let response = self.provider.complete(provider_request).await?;
        let result = parse_evaluation(&response.message.content);

        info!(verdict = %result.verdict, score = result.score, "Evaluation complete");
        Ok(result)
    }
}
