//! Web tools for WebScout.
//!
//! Two tools give the agent access to the web:
//! - `web_search`: query an HTML search endpoint and return ranked results
//! - `fetch_page`: download a page and return a plain-text excerpt
//!
//! Both share one `reqwest` client configured from `[tools]`.

pub mod fetch_page;
pub mod html;
pub mod web_search;

pub use fetch_page::FetchPageTool;
pub use web_search::WebSearchTool;

use webscout_config::ToolsConfig;
use webscout_core::tool::{Tool, ToolRegistry};

/// Build the HTTP client shared by the web tools.
pub fn http_client(config: &ToolsConfig) -> webscout_core::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| webscout_core::Error::config(format!("failed to build HTTP client: {e}")))
}

/// The built-in tools, in the order they are advertised to the model.
pub fn default_tools(config: &ToolsConfig) -> webscout_core::Result<Vec<Box<dyn Tool>>> {
    let client = http_client(config)?;
    Ok(vec![
        Box::new(WebSearchTool::new(client.clone(), config)?),
        Box::new(FetchPageTool::new(client, config)?),
    ])
}

/// Create a registry holding the built-in tools.
pub fn default_registry(config: &ToolsConfig) -> webscout_core::Result<ToolRegistry> {
    ToolRegistry::new(default_tools(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_advertises_both_tools() {
        let registry = default_registry(&ToolsConfig::default()).unwrap();
        assert_eq!(registry.names(), vec!["web_search", "fetch_page"]);
        for def in registry.definitions() {
            assert_eq!(def.parameters["type"], "object");
            assert!(!def.description.is_empty());
        }
    }
}
