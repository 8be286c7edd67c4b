//! `webscout config` — Configuration management commands.

use webscout_config::AppConfig;

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   OK  config parsed and validated");

            let warnings = warnings(&config);
            if warnings.is_empty() {
                println!("   OK  all checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   WARN  {w}");
                }
            }

            println!();
            println!("   Endpoint:   {}", config.api_url);
            println!("   Model:      {}", config.model);
            println!("   Max steps:  {}", config.max_steps);
            println!("   Streaming:  {}", config.stream);
            println!("   Evaluator:  {}", config.evaluator_model());
        }
        Err(e) => {
            println!("   ERROR  {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

/// Non-fatal problems that `load()` accepts.
fn warnings(config: &AppConfig) -> Vec<&'static str> {
    let mut warnings = Vec::new();
    if !config.has_api_key() {
        warnings.push("No API key set (set WEBSCOUT_API_KEY or OPENAI_API_KEY)");
    }
    if !config.api_url.starts_with("https://") {
        warnings.push("API endpoint is not HTTPS");
    }
    if config.tools.timeout_secs == 0 {
        warnings.push("Tool HTTP timeout of 0 seconds disables tool requests");
    }
    warnings
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    println!("{}", render_redacted(&config)?);
    Ok(())
}

fn render_redacted(config: &AppConfig) -> Result<String, toml::ser::Error> {
    let mut shown = config.clone();
    if shown.api_key.is_some() {
        shown.api_key = Some("***".into());
    }
    toml::to_string_pretty(&shown)
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}
