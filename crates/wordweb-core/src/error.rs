//! Error types for word handling.

use thiserror::Error;

/// Errors raised while turning user input into a word id.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WordError {
    /// The input normalized to nothing or contains characters no word can have.
    #[error("Invalid word provided: {input:?}")]
    InvalidWord { input: String },
}

impl WordError {
    pub fn invalid(input: impl Into<String>) -> Self {
        Self::InvalidWord {
            input: input.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WordError>;
