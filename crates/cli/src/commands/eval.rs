//! `webscout eval` — Grade an existing answer.

use clap::Args;
use webscout_config::AppConfig;
use webscout_eval::{EvaluationRequest, EvaluationResult, Evaluator};

#[derive(Args)]
pub struct EvalArgs {
    /// The question that was asked
    #[arg(long)]
    pub query: String,

    /// The answer to grade
    #[arg(long)]
    pub answer: String,

    /// Custom rubric text
    #[arg(long, value_name = "TEXT")]
    pub rubric: Option<String>,

    /// Reference material or URLs (repeatable)
    #[arg(long = "reference", value_name = "TEXT")]
    pub references: Vec<String>,
}

pub async fn run(args: EvalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    super::ask::require_api_key(&config)?;

    let provider = webscout_providers::build_from_config(&config)?;
    let evaluator = Evaluator::from_config(provider, &config);

    let mut request = EvaluationRequest::new(args.query, args.answer).with_references(args.references);
    if let Some(rubric) = args.rubric {
        request = request.with_rubric(rubric);
    }

    let result = evaluator.evaluate(&request).await?;
    print_result(&result);
    Ok(())
}

pub fn print_result(result: &EvaluationResult) {
    for line in render(result) {
        println!("{line}");
    }
}

fn render(result: &EvaluationResult) -> Vec<String> {
    let score = match result.score {
        0 => "n/a".to_string(),
        n => format!("{n}/5"),
    };
    let mut lines = vec![
        "--- evaluation ---".to_string(),
        format!("Verdict:      {}", result.verdict),
        format!("Score:        {score}"),
        format!("Reasoning:    {}", result.reasoning),
    ];
    if let Some(improvements) = &result.improvements {
        lines.push(format!("Improvements: {improvements}"));
    }
    lines
}
