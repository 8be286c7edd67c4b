//! Chat-completion provider implementations for WebScout.
//!
//! All providers implement the `webscout_core::Provider` trait.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use std::sync::Arc;
use webscout_config::AppConfig;
use webscout_core::{Provider, ProviderError};

/// Build the provider described by `config`.
///
/// Fails with [`ProviderError::NotConfigured`] when no API key is available.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config.api_key.as_deref().ok_or_else(|| {
        ProviderError::NotConfigured(
            "no API key; set WEBSCOUT_API_KEY or OPENAI_API_KEY, or api_key in config.toml".into(),
        )
    })?;

    let provider = OpenAiCompatProvider::new("openai-compat", &config.api_url, api_key)?;
    Ok(Arc::new(provider))
}
