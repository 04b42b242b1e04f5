//! errors.rs - Custom error types for the csvstrip-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that can be handled programmatically.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// This enum represents all possible error types in the `csvstrip-core` library.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StripError {
    #[error("Failed to read config file '{0}': {1}")]
    ConfigRead(String, std::io::Error),

    #[error("Failed to parse config file '{0}': {1}")]
    ConfigParse(String, serde_yml::Error),

    #[error("Ignored field index must be 1 or greater (got {0})")]
    InvalidFieldIndex(usize),

    #[error("Failed to connect to sink '{0}': {1}")]
    SinkConnection(String, sqlx::Error),

    #[error("An unexpected I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    #[error("A critical system error occurred: {0}")]
    AnyhowWrapper(#[from] anyhow::Error),
}
