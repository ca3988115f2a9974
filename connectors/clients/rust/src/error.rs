// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Error types for the PPL metadata client.
//!
//! All fallible operations in this crate return [`Result<T>`], an alias for
//! `std::result::Result<T, ClientError>`.

use thiserror::Error;

/// Error type for metadata client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The index (or other resource) does not exist on the cluster.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authentication or authorization failed. Check credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// An underlying HTTP / network transport error from `reqwest`.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The cluster returned an HTTP error status.
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Reason taken from the error body, or the bare status.
        message: String,
    },

    /// Client-side validation failed before the request was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The request exceeded the configured timeout.
    #[error("Timeout after {0}ms")]
    Timeout(u64),
}

/// Crate-level result alias using [`ClientError`].
pub type Result<T> = std::result::Result<T, ClientError>;
