// SPDX-License-Identifier: PMPL-1.0-or-later
//! Autocomplete error types.

use thiserror::Error;

/// Errors raised while fetching or interpreting backend metadata.
///
/// None of these reach the caller of [`crate::AutocompleteEngine::get_items`]:
/// the engine logs them and degrades to an empty candidate list.
#[derive(Error, Debug)]
pub enum AutocompleteError {
    #[error("metadata gateway failed: {0}")]
    Gateway(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("index missing from mapping response: {0}")]
    MissingIndex(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AutocompleteError {
    /// Wrap any transport error raised by a gateway implementation.
    pub fn gateway<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        AutocompleteError::Gateway(Box::new(err))
    }
}

/// Crate-level result alias.
pub type Result<T> = std::result::Result<T, AutocompleteError>;
