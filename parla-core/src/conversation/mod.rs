//! Per-user conversation memory
//!
//! Two independent stores back the roleplay and therapist chats. Each maps a
//! user id to the ordered list of exchanged messages. Nothing is persisted or
//! evicted: a store lives exactly as long as the process, or until reset.
//!
//! # Example
//!
//! ```rust,ignore
//! use parla_core::conversation::{ConversationStore, render_transcript};
//!
//! let store = ConversationStore::new("roleplay");
//! store.append_exchange("u1", "Can I get a coffee?", "Of course, what size?").await;
//!
//! let history = store.history("u1").await;
//! let transcript = render_transcript(&history);
//! ```

mod entry;
mod store;

pub use entry::{ConversationEntry, EntryRole, render_transcript};
pub use store::ConversationStore;
