//! The language assistant: one operation per capability.
//!
//! Each operation validates its input, renders a prompt, makes a single model
//! call and shapes the reply. The two chat capabilities also read and extend a
//! per-user [`ConversationStore`]. History is only written after the model
//! call succeeds, so a failed request leaves no trace.

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::conversation::{ConversationStore, render_transcript};
use crate::error::{ParlaError, Result};
use crate::llm::{LLMConfig, LLMProvider, ModelInfo};
use crate::parsing::JsonParser;
use crate::prompts;

/// Static messages for missing request fields.
pub mod messages {
    pub const SENTENCE_REQUIRED: &str = "Sentence is required";
    pub const ROLEPLAY_FIELDS_REQUIRED: &str = "userId, scenario, and message are required";
    pub const THERAPIST_FIELDS_REQUIRED: &str = "userId and message are required";
}

/// In-character reply plus feedback on the user's grammar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleplayReply {
    pub response: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub correction: String,
}

/// Models often send `null` for "nothing to correct"
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// What a reset call cleared
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    /// One user's history was removed
    User { store: &'static str, user_id: String },
    /// Every history in the store was removed
    All { store: &'static str, cleared: usize },
}

impl ResetOutcome {
    /// Human-readable confirmation returned to the caller
    pub fn message(&self) -> String {
        match self {
            ResetOutcome::User { store, user_id } => {
                format!("{} history for user {} has been reset.", capitalize(store), user_id)
            }
            ResetOutcome::All { store, .. } => {
                format!("All {} histories have been reset.", store)
            }
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Returns the trimmed value, or a validation error if it is missing or blank.
fn required<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ParlaError::Validation(message.to_string())),
    }
}

/// Front-end facing assistant shared by all request handlers
pub struct LanguageAssistant {
    provider: Arc<dyn LLMProvider>,
    llm_config: LLMConfig,
    roleplay: ConversationStore,
    therapist: ConversationStore,
    parser: JsonParser,
}

impl LanguageAssistant {
    pub fn new(provider: Arc<dyn LLMProvider>, llm_config: LLMConfig) -> Self {
        Self {
            provider,
            llm_config,
            roleplay: ConversationStore::new("roleplay"),
            therapist: ConversationStore::new("therapist"),
            parser: JsonParser::new(),
        }
    }

    pub fn roleplay_store(&self) -> &ConversationStore {
        &self.roleplay
    }

    pub fn therapist_store(&self) -> &ConversationStore {
        &self.therapist
    }

    pub fn model_info(&self) -> ModelInfo {
        self.provider.model_info()
    }

    async fn ask(&self, prompt: &str) -> Result<String> {
        debug!(prompt_len = prompt.len(), "sending prompt to model");
        let reply = self.provider.generate(prompt, &self.llm_config).await?;
        Ok(reply.trim().to_string())
    }

    /// Corrected sentence followed by alternative phrasings.
    pub async fn correct_grammar(&self, sentence: Option<&str>) -> Result<String> {
        let sentence = required(sentence, messages::SENTENCE_REQUIRED)?;
        self.ask(&prompts::grammar_correction(sentence)).await
    }

    /// Completion suggestions for an unfinished sentence.
    pub async fn auto_complete(&self, sentence: Option<&str>) -> Result<String> {
        let sentence = required(sentence, messages::SENTENCE_REQUIRED)?;
        self.ask(&prompts::auto_complete(sentence)).await
    }

    /// One roleplay turn.
    ///
    /// # Errors
    ///
    /// [`ParlaError::Validation`] when a field is missing, [`ParlaError::Llm`]
    /// when the model call fails, [`ParlaError::Parse`] when the reply holds
    /// no usable JSON object.
    pub async fn roleplay(
        &self,
        user_id: Option<&str>,
        scenario: Option<&str>,
        message: Option<&str>,
    ) -> Result<RoleplayReply> {
        let user_id = required(user_id, messages::ROLEPLAY_FIELDS_REQUIRED)?;
        let scenario = required(scenario, messages::ROLEPLAY_FIELDS_REQUIRED)?;
        let message = required(message, messages::ROLEPLAY_FIELDS_REQUIRED)?;

        let history = self.roleplay.history(user_id).await;
        let prompt = prompts::roleplay(scenario, &render_transcript(&history), message);
        let raw = self.ask(&prompt).await?;

        let reply: RoleplayReply = self.parser.parse_as(&raw).inspect_err(|e| {
            warn!(user_id, error = %e, "roleplay reply was not valid JSON");
        })?;

        self.roleplay
            .append_exchange(user_id, message, &reply.response)
            .await;
        Ok(reply)
    }

    /// One therapist-chat turn.
    pub async fn therapist_chat(
        &self,
        user_id: Option<&str>,
        message: Option<&str>,
    ) -> Result<String> {
        let user_id = required(user_id, messages::THERAPIST_FIELDS_REQUIRED)?;
        let message = required(message, messages::THERAPIST_FIELDS_REQUIRED)?;

        let history = self.therapist.history(user_id).await;
        let prompt = prompts::therapist(&render_transcript(&history), message);
        let reply = self.ask(&prompt).await?;

        self.therapist.append_exchange(user_id, message, &reply).await;
        Ok(reply)
    }

    /// Reset one user's roleplay history, or all of them.
    pub async fn reset_roleplay(&self, user_id: Option<&str>) -> Result<ResetOutcome> {
        Self::reset(&self.roleplay, user_id).await
    }

    /// Reset one user's therapist history, or all of them.
    pub async fn reset_therapist(&self, user_id: Option<&str>) -> Result<ResetOutcome> {
        Self::reset(&self.therapist, user_id).await
    }

    async fn reset(store: &ConversationStore, user_id: Option<&str>) -> Result<ResetOutcome> {
        // A blank id is treated like an absent one
        match user_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(user_id) => {
                store.reset_user(user_id).await?;
                Ok(ResetOutcome::User {
                    store: store.name(),
                    user_id: user_id.to_string(),
                })
            }
            None => Ok(ResetOutcome::All {
                store: store.name(),
                cleared: store.reset_all().await,
            }),
        }
    }
}
