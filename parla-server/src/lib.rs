//! HTTP front end for the Parla language assistant.
//!
//! Six JSON `POST` routes plus `GET /health`, all backed by one shared
//! [`LanguageAssistant`](parla_core::assistant::LanguageAssistant).

pub mod error;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, build_app, serve};
