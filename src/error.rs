//! Error types for the cache facade
//!
//! Provides unified error handling using thiserror.

use std::error::Error as StdError;

use thiserror::Error;

/// Boxed source error carried by codec failures.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

// == Cache Error Enum ==
/// Unified error type for the cache facade.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Transport or connection failure reported by the backing store
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Stored data could not be decoded into the requested shape
    #[error("Corrupt cache entry at '{key}': {source}")]
    CorruptEntry {
        key: String,
        #[source]
        source: BoxError,
    },

    /// A value could not be encoded before being written
    #[error("Failed to serialize value for '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: BoxError,
    },

    /// A configured key template is malformed
    #[error("Invalid key template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    /// Configuration could not be loaded
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The caller-supplied factory failed
    #[error("Factory failed: {0}")]
    FactoryFailure(#[source] anyhow::Error),

    /// The operation was cancelled before completion
    #[error("Operation cancelled")]
    Cancelled,
}

impl CacheError {
    /// Wraps a backend failure as [`CacheError::StoreUnavailable`].
    pub fn store_unavailable(err: impl std::fmt::Display) -> Self {
        CacheError::StoreUnavailable(err.to_string())
    }

    pub(crate) fn invalid_template(template: &str, reason: impl Into<String>) -> Self {
        CacheError::InvalidTemplate {
            template: template.to_string(),
            reason: reason.into(),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache facade.
pub type Result<T> = std::result::Result<T, CacheError>;
