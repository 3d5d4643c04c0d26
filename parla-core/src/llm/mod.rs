//! Access to the hosted generative-language model.
//!
//! Every route sends one formatted prompt and receives free text back, so the
//! provider surface is small: [`LLMProvider::generate`] for plain
//! prompts and [`LLMProvider::generate_request`] for providers to implement.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{ParlaError, Result};

/// Generation settings applied to every model call.
#[derive(Debug, Clone, PartialEq)]
pub struct LLMConfig {
    /// Temperature for generation (0.0-2.0, default: 0.7)
    pub temperature: f32,

    /// Maximum tokens to generate (default: 1024)
    pub max_tokens: usize,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

impl LLMConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    pub fn with_max_tokens(mut self, tokens: usize) -> Self {
        self.max_tokens = tokens;
        self
    }
}

/// A single-prompt request to an LLM provider
#[derive(Debug, Clone)]
pub struct LLMRequest {
    /// The fully formatted prompt, sent as one user turn
    pub prompt: String,

    /// Temperature for generation (0.0-2.0)
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: usize,
}

impl LLMRequest {
    pub fn new(prompt: impl Into<String>, config: &LLMConfig) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Response from an LLM provider
#[derive(Debug, Clone)]
pub struct LLMResponse {
    /// Generated content
    pub content: String,

    /// Token usage information
    pub usage: Option<TokenUsage>,
}

/// Token usage information
#[derive(Debug, Clone)]
pub struct TokenUsage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

/// Trait for LLM provider implementations.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate text for a single formatted prompt.
    async fn generate(&self, prompt: &str, config: &LLMConfig) -> Result<String> {
        let request = LLMRequest::new(prompt, config);
        let response = self.generate_request(&request).await?;
        Ok(response.content)
    }

    /// Generate text from a structured request.
    async fn generate_request(&self, request: &LLMRequest) -> Result<LLMResponse>;

    /// Get model information
    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "unknown".to_string(),
            model_name: "unknown".to_string(),
        }
    }
}

/// Model information
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub provider: String,
    #[serde(rename = "model")]
    pub model_name: String,
}

/// Provider used when no model service is configured; every call fails.
pub struct StubLLMProvider;

#[async_trait]
impl LLMProvider for StubLLMProvider {
    async fn generate_request(&self, _request: &LLMRequest) -> Result<LLMResponse> {
        Err(ParlaError::Configuration(
            "LLM provider not configured. Set GEMINI_API_KEY or configure [llm] in parla.toml"
                .to_string(),
        ))
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "stub".to_string(),
            model_name: "none".to_string(),
        }
    }
}

pub mod factory;
pub mod providers;

pub use factory::LLMProviderFactory;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_config() {
        let config = LLMConfig::new().with_temperature(1.5).with_max_tokens(1000);

        assert_eq!(config.temperature, 1.5);
        assert_eq!(config.max_tokens, 1000);
    }

    #[test]
    fn test_temperature_clamping() {
        let config = LLMConfig::new().with_temperature(5.0);
        assert_eq!(config.temperature, 2.0);

        let config = LLMConfig::new().with_temperature(-1.0);
        assert_eq!(config.temperature, 0.0);
    }

    #[test]
    fn test_request_carries_config() {
        let config = LLMConfig::new().with_temperature(0.2);
        let request = LLMRequest::new("Hello", &config);

        assert_eq!(request.prompt, "Hello");
        assert_eq!(request.temperature, 0.2);
        assert_eq!(request.max_tokens, 1024);
    }

    #[tokio::test]
    async fn test_stub_provider() {
        let provider = StubLLMProvider;
        let result = provider.generate("test", &LLMConfig::default()).await;
        assert!(matches!(result, Err(ParlaError::Configuration(_))));
        assert_eq!(provider.model_info().provider, "stub");
    }
}
