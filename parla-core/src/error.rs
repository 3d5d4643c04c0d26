//! Error types for Parla operations

use crate::parsing::ParseError;

/// Result type for Parla operations
pub type Result<T> = std::result::Result<T, ParlaError>;

/// Error types for the Parla assistant
#[derive(Debug, thiserror::Error)]
pub enum ParlaError {
    /// A required request field is missing or blank
    #[error("{0}")]
    Validation(String),

    /// Scoped reset for a user that has no history
    #[error("No conversation history for user: {0}")]
    UserNotFound(String),

    /// The model service failed or returned nothing usable
    #[error("LLM error: {0}")]
    Llm(String),

    /// Model output did not contain the expected JSON
    #[error("Failed to parse model output: {0}")]
    Parse(#[from] ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_verbatim() {
        let err = ParlaError::Validation("Sentence is required".into());
        assert_eq!(err.to_string(), "Sentence is required");
    }

    #[test]
    fn test_parse_error_converts() {
        let err: ParlaError = ParseError::EmptyInput.into();
        assert!(matches!(err, ParlaError::Parse(ParseError::EmptyInput)));
        assert_eq!(err.to_string(), "Failed to parse model output: Empty input");
    }
}
