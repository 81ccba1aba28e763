//! Store Error Types
//!
//! This module defines error types for the document store boundary. Every
//! variant is an "external store error" from the engine's point of view:
//! the engine surfaces them immediately and never retries (the bounded
//! startup discovery poll is the only exception, and it lives in the
//! service layer).

use thiserror::Error;

/// Document store operation errors
///
/// Covers transport failures, store-side rejections, and malformed
/// responses. Service-layer concerns (missing blocks, policy violations)
/// are handled by `ServiceError`.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Transport-level failure reaching the store
    #[error("Store request failed: {0}")]
    Http(String),

    /// The store answered but rejected the call
    #[error("Store API error (code {code}): {msg}")]
    Api { code: i64, msg: String },

    /// The store's response could not be decoded
    #[error("Failed to decode store response: {0}")]
    Decode(String),

    /// The store is not ready to serve requests
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The call named a block the store does not know
    #[error("Store has no block with ID {0}")]
    MissingBlock(String),
}

impl StoreError {
    /// Create an API rejection error
    pub fn api(code: i64, msg: impl Into<String>) -> Self {
        Self::Api {
            code,
            msg: msg.into(),
        }
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}
