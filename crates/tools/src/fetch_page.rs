//! Page fetch tool: HTTP GET plus text extraction.

use crate::html::{HtmlText, truncate_chars};
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;
use webscout_config::{MAX_FETCH_CHARS, MIN_FETCH_CHARS, ToolsConfig};
use webscout_core::error::ToolError;
use webscout_core::tool::Tool;

const TOOL_NAME: &str = "fetch_page";

pub struct FetchPageTool {
    client: reqwest::Client,
    default_chars: usize,
    text: HtmlText,
}

#[derive(Debug, Serialize)]
struct PageExcerpt<'a> {
    url: &'a str,
    status: u16,
    excerpt: String,
}

impl FetchPageTool {
    pub fn new(client: reqwest::Client, config: &ToolsConfig) -> webscout_core::Result<Self> {
        Ok(Self {
            client,
            default_chars: config.default_fetch_chars.clamp(MIN_FETCH_CHARS, MAX_FETCH_CHARS),
            text: HtmlText::new()
                .map_err(|e| webscout_core::Error::Internal(format!("html extractor: {e}")))?,
        })
    }

    fn failed(reason: impl Into<String>) -> ToolError {
        ToolError::ExecutionFailed {
            tool_name: TOOL_NAME.into(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Tool for FetchPageTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Fetch a web page and return a plain-text excerpt of its content as JSON \
         {url, status, excerpt}."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Absolute http(s) URL to fetch"
                },
                "max_chars": {
                    "type": "integer",
                    "description": format!(
                        "Excerpt length in characters ({MIN_FETCH_CHARS}-{MAX_FETCH_CHARS}, default {})",
                        self.default_chars
                    ),
                    "minimum": MIN_FETCH_CHARS,
                    "maximum": MAX_FETCH_CHARS
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let url = arguments["url"]
            .as_str()
            .map(str::trim)
            .ok_or_else(|| ToolError::InvalidArguments("fetch_page: missing 'url' argument".into()))?;

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ToolError::InvalidArguments(format!(
                "fetch_page: URL must start with http:// or https://, got '{url}'"
            )));
        }

        let max_chars = arguments["max_chars"]
            .as_u64()
            .map_or(self.default_chars, |n| n as usize)
            .clamp(MIN_FETCH_CHARS, MAX_FETCH_CHARS);

        debug!(url, max_chars, "fetch_page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Self::failed(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(Self::failed(format!("{url} returned HTTP {}", status.as_u16())));
        }

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_none_or(|ct| ct.contains("html"));

        let body = response
            .text()
            .await
            .map_err(|e| Self::failed(format!("failed to read body of {url}: {e}")))?;

        let text = if is_html {
            self.text.to_text(&body)
        } else {
            body.trim().to_string()
        };

        let page = PageExcerpt {
            url,
            status: status.as_u16(),
            excerpt: truncate_chars(&text, max_chars),
        };
        serde_json::to_string(&page).map_err(|e| Self::failed(e.to_string()))
    }
}
