//! Configuration types for the Parla service

use serde::{Deserialize, Serialize};

use crate::error::{ParlaError, Result};
use crate::llm::LLMConfig;

/// Main configuration for Parla
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ParlaConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// LLM provider configuration
    pub llm: LLMProviderConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub bind: String,

    /// Port to listen on
    pub port: u16,

    /// Maximum accepted request body size
    pub body_limit_bytes: usize,

    /// Allow any origin (the front end is served from elsewhere)
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3000,
            body_limit_bytes: 1024 * 1024,
            cors_permissive: true,
        }
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LLMProviderConfig {
    /// Provider type
    pub provider: LLMProviderKind,

    /// Model name (empty means the provider default)
    pub model: String,

    /// API key (if needed, prefer env vars)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL (for custom or compatible endpoints)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Sampling temperature (0.0-2.0)
    pub temperature: f32,

    /// Maximum tokens to generate per reply
    pub max_tokens: usize,
}

impl Default for LLMProviderConfig {
    fn default() -> Self {
        Self {
            provider: LLMProviderKind::Gemini,
            model: String::new(),
            api_key: None,
            base_url: None,
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

impl LLMProviderConfig {
    /// Generation settings handed to the provider on every call.
    pub fn to_llm_config(&self) -> LLMConfig {
        LLMConfig::new()
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }

    /// Copy of this config that is safe to print.
    pub fn redacted(&self) -> Self {
        Self {
            api_key: self.api_key.as_ref().map(|_| "<redacted>".to_string()),
            ..self.clone()
        }
    }
}

/// LLM provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LLMProviderKind {
    /// Google Gemini `generateContent`
    Gemini,
    /// Any OpenAI-compatible `/chat/completions` endpoint
    OpenAI,
}

impl ParlaConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Loads in this order:
    /// 1. Default configuration
    /// 2. `parla.toml` in the working directory
    /// 3. File named by `PARLA_CONFIG_PATH`
    /// 4. `PARLA_` environment variables, nested with `__`
    ///    (e.g. `PARLA_SERVER__PORT=8080`)
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is invalid or the merged
    /// configuration fails validation.
    pub fn load() -> Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Serialized, Toml},
        };

        let mut figment = Figment::from(Serialized::defaults(ParlaConfig::default()))
            .merge(Toml::file("parla.toml"));

        if let Ok(path) = std::env::var("PARLA_CONFIG_PATH") {
            figment = figment.merge(Toml::file(path));
        }

        let figment = figment.merge(
            Env::prefixed("PARLA_")
                .ignore(&["CONFIG_PATH"])
                .split("__"),
        );

        let config: ParlaConfig = figment.extract().map_err(|e| {
            ParlaError::Configuration(format!("Failed to load configuration: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or fails validation.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Serialized, Toml},
        };

        let config: ParlaConfig = Figment::from(Serialized::defaults(ParlaConfig::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| {
                ParlaError::Configuration(format!("Failed to load configuration file: {}", e))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ParlaError::Configuration(
                "server.port must be non-zero".to_string(),
            ));
        }
        if self.server.body_limit_bytes == 0 {
            return Err(ParlaError::Configuration(
                "server.body_limit_bytes must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ParlaError::Configuration(format!(
                "llm.temperature must be within 0.0-2.0, got {}",
                self.llm.temperature
            )));
        }
        if self.llm.max_tokens == 0 {
            return Err(ParlaError::Configuration(
                "llm.max_tokens must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Copy of this config with secrets hidden.
    pub fn redacted(&self) -> Self {
        Self {
            server: self.server.clone(),
            llm: self.llm.redacted(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = ParlaConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.llm.provider, LLMProviderKind::Gemini);
        assert!(config.llm.model.is_empty());
    }

    #[test]
    fn test_from_file_merges_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 8088

[llm]
provider = "openai"
model = "gpt-4o-mini"
temperature = 0.2
"#
        )
        .unwrap();

        let config = ParlaConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.llm.provider, LLMProviderKind::OpenAI);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.max_tokens, 1024);
    }

    #[test]
    fn test_from_file_rejects_invalid_temperature() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[llm]\ntemperature = 3.5").unwrap();

        let result = ParlaConfig::from_file(file.path());
        assert!(matches!(result, Err(ParlaError::Configuration(_))));
    }

    #[test]
    fn test_from_file_rejects_unknown_provider() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[llm]\nprovider = \"claude\"").unwrap();
        assert!(ParlaConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_redacted_hides_api_key() {
        let mut config = ParlaConfig::default();
        config.llm.api_key = Some("secret".to_string());
        let redacted = config.redacted();
        assert_eq!(redacted.llm.api_key.as_deref(), Some("<redacted>"));
        assert_eq!(config.llm.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_to_llm_config() {
        let mut config = LLMProviderConfig::default();
        config.temperature = 0.3;
        config.max_tokens = 256;
        let llm = config.to_llm_config();
        assert_eq!(llm.temperature, 0.3);
        assert_eq!(llm.max_tokens, 256);
    }
}
