//! Conversation entries

use serde::{Deserialize, Serialize};

/// Who said it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryRole {
    User,
    Ai,
}

impl EntryRole {
    /// Speaker label used when the history is rendered into a prompt
    pub fn label(&self) -> &'static str {
        match self {
            EntryRole::User => "User",
            EntryRole::Ai => "AI",
        }
    }
}

/// A single message in a user's conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub role: EntryRole,
    pub content: String,
}

impl ConversationEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: EntryRole::User,
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: EntryRole::Ai,
            content: content.into(),
        }
    }
}

/// Render entries as a plain transcript, one `Speaker: text` line each.
pub fn render_transcript(entries: &[ConversationEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{}: {}", e.role.label(), e.content))
        .collect::<Vec<_>>()
        .join("\n")
}
