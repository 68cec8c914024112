//! Base error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! `#[from]` variant, the way each subsystem keeps its own failure modes.

use thiserror::Error;

/// Malformed inputs detected by `fl-core` primitives.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("geometry error: {0}")]
    Geometry(String),

    #[error("invalid range: {0}")]
    Range(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `fl-core`.
pub type CoreResult<T> = Result<T, CoreError>;
