//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types shared across the Nitaq workspace. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Validation errors carry the offending value so callers can surface it.
//! - Canonicalization errors fail loudly; a silent fallback would split the
//!   fingerprint space between processes.

use thiserror::Error;

/// Top-level error type for the Nitaq core crate.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Identifier or field validation failure.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Timestamp parse or range failure.
    #[error("temporal error: {0}")]
    Temporal(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Numeric answers must be strings or integers.
    #[error("float values are not permitted in canonical representations; use string or integer: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error validating an identifier or structured field at construction.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Catalog version strings must be non-empty and printable ASCII.
    #[error("invalid catalog version: {0:?}")]
    InvalidCatalogVersion(String),

    /// Unknown catalog item type name.
    #[error("unknown catalog item type: {0:?}")]
    UnknownItemType(String),
}
