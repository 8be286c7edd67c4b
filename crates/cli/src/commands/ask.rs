//! `webscout ask` — Research a question with the ReAct agent.

use clap::Args;
use std::sync::Arc;
use tracing::debug;
use webscout_agent::{ReactAgent, RunOptions};
use webscout_config::AppConfig;
use webscout_eval::{EvaluationRequest, Evaluator};

use crate::console::ConsoleObserver;

#[derive(Args)]
pub struct AskArgs {
    /// The question to research
    pub query: String,

    /// Print the run transcript after the answer
    #[arg(long)]
    pub debug: bool,

    /// Request whole responses instead of streaming
    #[arg(long)]
    pub no_stream: bool,

    /// Override the step budget
    #[arg(long, value_name = "N")]
    pub max_steps: Option<u32>,

    /// Grade the answer after the run
    #[arg(long)]
    pub evaluate: bool,

    /// Rubric for --evaluate (defaults to the built-in rubric)
    #[arg(long, value_name = "TEXT", requires = "evaluate")]
    pub rubric: Option<String>,
}

pub async fn run(args: AskArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    require_api_key(&config)?;

    if args.max_steps == Some(0) {
        return Err("--max-steps must be at least 1".into());
    }

    let provider = webscout_providers::build_from_config(&config)?;
    let tools = Arc::new(webscout_tools::default_registry(&config.tools)?);
    let agent_tools: Vec<String> = tools.names().into_iter().map(String::from).collect();

    let mut agent = ReactAgent::from_config(provider.clone(), tools, &config);
    if let Some(steps) = args.max_steps {
        agent = agent.with_max_steps(steps);
    }
    if args.no_stream {
        agent = agent.with_streaming(false);
    }

    debug!(
        endpoint = %config.api_url,
        model = %config.model,
        tools = ?agent_tools,
        "Starting ask"
    );

    let console = ConsoleObserver::stderr();
    let options = RunOptions {
        debug: args.debug,
        observer: Some(&console),
    };
    let output = agent.run(&args.query, options).await?;

    println!("{}", output.answer);

    if let Some(transcript) = &output.transcript {
        println!();
        println!("--- transcript ({} steps) ---", output.steps);
        for record in transcript {
            println!("{record}");
        }
    }

    if args.evaluate {
        let evaluator = Evaluator::from_config(provider, &config);
        let mut request = EvaluationRequest::new(&args.query, &output.answer);
        if let Some(rubric) = args.rubric {
            request = request.with_rubric(rubric);
        }
        let result = evaluator.evaluate(&request).await?;
        println!();
        super::eval::print_result(&result);
    }

    Ok(())
}

/// Fail early with setup instructions when no key is configured.
pub(crate) fn require_api_key(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.has_api_key() {
        return Ok(());
    }
    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    WEBSCOUT_API_KEY    (generic)");
    eprintln!("    OPENAI_API_KEY      (OpenAI direct)");
    eprintln!("    OPENROUTER_API_KEY  (with WEBSCOUT_API_URL=https://openrouter.ai/api/v1)");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
    Err("No API key found. See above for setup instructions.".into())
}
