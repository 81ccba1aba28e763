//! Service Layer Error Types
//!
//! Error types for the engine's public operations. Store failures are
//! wrapped; policy rejections and missing references get their own
//! variants so callers can tell a user-facing refusal from an external
//! failure.

use crate::store::StoreError;
use thiserror::Error;

/// Engine operation errors
#[derive(Error, Debug)]
pub enum ServiceError {
    /// A referenced block does not exist in the store
    #[error("Block not found: {id}")]
    BlockNotFound { id: String },

    /// List-item relocation attempted while the policy forbids it.
    /// Raised before any mutation is issued.
    #[error("Moving list items is disabled by settings (block {block_id})")]
    PolicyViolation { block_id: String },

    /// The renderer factory was handed an unrecognized variant.
    /// Raised before any store call is issued.
    #[error("Unknown render variant: {0}")]
    UnknownVariant(String),

    /// An external store call failed. Operations already performed before
    /// the failing call are not rolled back.
    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Create a block not found error
    pub fn block_not_found(id: impl Into<String>) -> Self {
        Self::BlockNotFound { id: id.into() }
    }

    /// Create a policy violation error
    pub fn policy_violation(block_id: impl Into<String>) -> Self {
        Self::PolicyViolation {
            block_id: block_id.into(),
        }
    }

    /// Create an unknown variant error
    pub fn unknown_variant(variant: impl Into<String>) -> Self {
        Self::UnknownVariant(variant.into())
    }
}
