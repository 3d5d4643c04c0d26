//! In-memory conversation store

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::entry::ConversationEntry;
use crate::error::{ParlaError, Result};

/// Map of user id to that user's ordered conversation history.
///
/// Cloning is cheap and every clone sees the same data.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    name: &'static str,
    histories: Arc<RwLock<HashMap<String, Vec<ConversationEntry>>>>,
}

impl ConversationStore {
    /// Create an empty store; `name` only shows up in logs.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            histories: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Snapshot of a user's history (empty for unknown users)
    pub async fn history(&self, user_id: &str) -> Vec<ConversationEntry> {
        self.histories
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Append one entry, creating the user's history if needed
    pub async fn append(&self, user_id: &str, entry: ConversationEntry) {
        self.histories
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .push(entry);
    }

    /// Append a user message and the AI reply together, in that order.
    pub async fn append_exchange(&self, user_id: &str, user_text: &str, ai_text: &str) {
        let mut histories = self.histories.write().await;
        let history = histories.entry(user_id.to_string()).or_default();
        history.push(ConversationEntry::user(user_text));
        history.push(ConversationEntry::ai(ai_text));
        tracing::debug!(
            store = self.name,
            user_id,
            entries = history.len(),
            "conversation exchange recorded"
        );
    }

    /// Forget one user's history.
    ///
    /// # Errors
    ///
    /// Returns [`ParlaError::UserNotFound`] if the user has no history.
    pub async fn reset_user(&self, user_id: &str) -> Result<()> {
        match self.histories.write().await.remove(user_id) {
            Some(_) => {
                tracing::info!(store = self.name, user_id, "conversation history reset");
                Ok(())
            }
            None => Err(ParlaError::UserNotFound(user_id.to_string())),
        }
    }

    /// Forget everyone; returns how many users were cleared
    pub async fn reset_all(&self) -> usize {
        let mut histories = self.histories.write().await;
        let cleared = histories.len();
        histories.clear();
        tracing::info!(store = self.name, cleared, "all conversation histories reset");
        cleared
    }

    pub async fn contains(&self, user_id: &str) -> bool {
        self.histories.read().await.contains_key(user_id)
    }

    pub async fn user_count(&self) -> usize {
        self.histories.read().await.len()
    }
}
