//! # Parla - a language-learning assistant on top of a hosted LLM
//!
//! Parla turns learner text into prompts, sends them to a generative model
//! and reshapes the replies into fixed contracts:
//! - Grammar correction with alternative phrasings
//! - Sentence auto-completion
//! - Scenario roleplay with grammar feedback and per-user memory
//! - A supportive "therapist" chat with per-user memory
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use parla_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ParlaConfig::load()?;
//!     let provider = LLMProviderFactory::create(&config.llm)?;
//!     let assistant = LanguageAssistant::new(provider, config.llm.to_llm_config());
//!
//!     let corrected = assistant.correct_grammar(Some("she go to school")).await?;
//!     println!("{corrected}");
//!
//!     let reply = assistant
//!         .roleplay(Some("u1"), Some("Ordering coffee"), Some("I wants a latte"))
//!         .await?;
//!     println!("{} ({})", reply.response, reply.correction);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `llm-gemini`: Google Gemini provider (default)
//! - `llm-openai`: OpenAI-compatible provider (default)

pub mod assistant;
pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod parsing;
pub mod prompts;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::assistant::{LanguageAssistant, ResetOutcome, RoleplayReply};
    pub use crate::config::{LLMProviderConfig, LLMProviderKind, ParlaConfig, ServerConfig};
    pub use crate::conversation::{ConversationEntry, ConversationStore, EntryRole};
    pub use crate::error::{ParlaError, Result};
    pub use crate::llm::{
        LLMConfig, LLMProvider, LLMProviderFactory, LLMRequest, LLMResponse, ModelInfo,
        StubLLMProvider,
    };
    pub use crate::parsing::{JsonParser, ParseError};
}
