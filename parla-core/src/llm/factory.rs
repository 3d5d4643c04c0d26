//! Factory for creating LLM providers from configuration

use crate::config::{LLMProviderConfig, LLMProviderKind};
use crate::error::Result;
use crate::llm::LLMProvider;
use std::sync::Arc;

#[cfg(feature = "llm-gemini")]
use crate::llm::providers::gemini::{self, GeminiProvider};

#[cfg(feature = "llm-openai")]
use crate::llm::providers::openai::{self, OpenAIProvider};

/// Factory for creating LLM providers
pub struct LLMProviderFactory;

impl LLMProviderFactory {
    /// Create an LLM provider from configuration.
    ///
    /// An explicit `api_key` wins; otherwise the provider reads its own
    /// environment variables. An empty `model` selects the provider default.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be created (e.g., missing API key)
    pub fn create(config: &LLMProviderConfig) -> Result<Arc<dyn LLMProvider>> {
        let model = if config.model.is_empty() {
            None
        } else {
            Some(config.model.clone())
        };

        match config.provider {
            #[cfg(feature = "llm-gemini")]
            LLMProviderKind::Gemini => {
                let provider = match &config.api_key {
                    Some(api_key) => GeminiProvider::new(
                        api_key.clone(),
                        model
                            .or_else(|| std::env::var("GEMINI_MODEL").ok())
                            .unwrap_or_else(|| gemini::DEFAULT_MODEL.to_string()),
                    ),
                    None => GeminiProvider::from_env(model)?,
                };
                let provider = match &config.base_url {
                    Some(url) => provider.at_base_url(url.clone()),
                    None => provider,
                };
                Ok(Arc::new(provider))
            }

            #[cfg(not(feature = "llm-gemini"))]
            LLMProviderKind::Gemini => Err(crate::error::ParlaError::Configuration(
                "Gemini provider requires 'llm-gemini' feature".to_string(),
            )),

            #[cfg(feature = "llm-openai")]
            LLMProviderKind::OpenAI => {
                let provider = match &config.api_key {
                    Some(api_key) => OpenAIProvider::new(
                        api_key.clone(),
                        model
                            .or_else(|| std::env::var("OPENAI_MODEL").ok())
                            .unwrap_or_else(|| openai::DEFAULT_MODEL.to_string()),
                    ),
                    None => OpenAIProvider::from_env(model)?,
                };
                let provider = match &config.base_url {
                    Some(url) => provider.at_base_url(url.clone()),
                    None => provider,
                };
                Ok(Arc::new(provider))
            }

            #[cfg(not(feature = "llm-openai"))]
            LLMProviderKind::OpenAI => Err(crate::error::ParlaError::Configuration(
                "OpenAI provider requires 'llm-openai' feature".to_string(),
            )),
        }
    }
}
