//! Error types for the session layer.

use std::time::Duration;
use thiserror::Error;
use wordweb_core::WordError;

/// Failures reported by a word source.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{0}")]
    Failed(String),

    #[error("Word lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid dictionary data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a navigation operation did not complete.
///
/// The display string is what the session shows as its error message.
#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error(transparent)]
    InvalidWord(#[from] WordError),

    #[error("Failed to load word: {0}")]
    Provider(#[from] ProviderError),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sled(#[from] sled::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),
}
