//! Parsing of model output.
//!
//! Models are asked to answer with a JSON object but routinely wrap it in
//! prose or Markdown fences, or emit almost-JSON. [`JsonParser`] digs the
//! object out and repairs the common mistakes before giving up.
//!
//! # Example
//!
//! ```rust
//! use parla_core::parsing::JsonParser;
//!
//! let parser = JsonParser::new();
//! let value = parser.parse("Sure! ```json\n{\"response\": \"Hola\",}\n```").unwrap();
//! assert_eq!(value["response"], "Hola");
//! ```

mod json;

pub use json::JsonParser;

/// Error type for parsing operations
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ParseError {
    /// No usable JSON in the input
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// JSON was found but lacks a field the caller needs
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Empty input
    #[error("Empty input")]
    EmptyInput,
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;
