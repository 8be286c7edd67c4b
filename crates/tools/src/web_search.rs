//! Web search tool backed by an HTML search results page.
//!
//! The default endpoint is DuckDuckGo's HTML interface, which needs no API
//! key. Failures never surface as `Err`: they are serialized as
//! `{"error": "..."}` so the model can read them and try something else.

use crate::html::HtmlText;
use async_trait::async_trait;
use regex_lite::Regex;
use serde::Serialize;
use tracing::{debug, warn};
use webscout_config::ToolsConfig;
use webscout_core::error::ToolError;
use webscout_core::tool::Tool;

pub struct WebSearchTool {
    client: reqwest::Client,
    endpoint: String,
    max_results: usize,
    parser: ResultParser,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

impl WebSearchTool {
    pub fn new(client: reqwest::Client, config: &ToolsConfig) -> webscout_core::Result<Self> {
        Ok(Self {
            client,
            endpoint: config.search_url.clone(),
            max_results: config.max_search_results.max(1),
            parser: ResultParser::new()
                .map_err(|e| webscout_core::Error::Internal(format!("search parser: {e}")))?,
        })
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| format!("search request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("search endpoint returned HTTP {}", status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| format!("failed to read search response: {e}"))?;

        let mut results = self.parser.parse(&body);
        results.truncate(limit);
        Ok(results)
    }
}

fn error_payload(message: impl Into<String>) -> String {
    serde_json::json!({ "error": message.into() }).to_string()
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web. Returns a JSON array of results with title, url and snippet. \
         Use fetch_page to read a result in full."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "max_results": {
                    "type": "integer",
                    "description": format!("Number of results to return (1-{})", self.max_results),
                    "minimum": 1,
                    "maximum": self.max_results
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let Some(query) = arguments["query"].as_str().map(str::trim).filter(|q| !q.is_empty())
        else {
            return Ok(error_payload("missing required argument 'query'"));
        };

        let limit = arguments["max_results"]
            .as_u64()
            .map_or(self.max_results, |n| n as usize)
            .clamp(1, self.max_results);

        debug!(query, limit, "web_search");

        match self.search(query, limit).await {
            Ok(results) => Ok(serde_json::to_string_pretty(&results).unwrap_or_else(|_| "[]".into())),
            Err(message) => {
                warn!(query, error = %message, "web_search failed");
                Ok(error_payload(message))
            }
        }
    }
}

/// Pulls results out of a DuckDuckGo-style HTML results page.
///
/// Each result is an anchor with class `result__a`; the snippet is the next
/// anchor with class `result__snippet`.
struct ResultParser {
    anchor: Regex,
    class: Regex,
    href: Regex,
    text: HtmlText,
}

impl ResultParser {
    fn new() -> Result<Self, regex_lite::Error> {
        Ok(Self {
            anchor: Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a\s*>")?,
            class: Regex::new(r#"(?i)\bclass\s*=\s*"([^"]*)""#)?,
            href: Regex::new(r#"(?i)\bhref\s*=\s*"([^"]*)""#)?,
            text: HtmlText::new()?,
        })
    }

    fn parse(&self, body: &str) -> Vec<SearchResult> {
        let mut results: Vec<SearchResult> = Vec::new();

        for caps in self.anchor.captures_iter(body) {
            let attrs = caps.get(1).map_or("", |m| m.as_str());
            let inner = caps.get(2).map_or("", |m| m.as_str());
            let class = self
                .class
                .captures(attrs)
                .and_then(|c| c.get(1))
                .map_or("", |m| m.as_str());

            if class.split_whitespace().any(|c| c == "result__a") {
                let Some(href) = self.href.captures(attrs).and_then(|c| c.get(1)) else {
                    continue;
                };
                results.push(SearchResult {
                    title: self.text.to_text(inner),
                    url: resolve_href(href.as_str()),
                    snippet: String::new(),
                });
            } else if class.split_whitespace().any(|c| c == "result__snippet")
                && let Some(last) = results.last_mut()
                && last.snippet.is_empty()
            {
                last.snippet = self.text.to_text(inner);
            }
        }

        results
    }
}

/// Unwrap DuckDuckGo redirect links (`//duckduckgo.com/l/?uddg=<target>`).
fn resolve_href(href: &str) -> String {
    let href = href.replace("&amp;", "&");
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href
    };

    match reqwest::Url::parse(&absolute) {
        Ok(url) => url
            .query_pairs()
            .find(|(k, _)| k == "uddg")
            .map(|(_, v)| v.into_owned())
            .unwrap_or(absolute),
        Err(_) => absolute,
    }
}
