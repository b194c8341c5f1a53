//! Error types for the core crate.

use thiserror::Error;

/// Core error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Malformed UUID string, or a UUID that is not version 4.
    #[error("Invalid UUID: {0}")]
    InvalidUuid(String),

    /// Input does not fit into a fixed-width field.
    #[error("Buffer too small: {len} bytes do not fit into a {capacity}-byte field")]
    BufferTooSmall {
        /// Length of the rejected input.
        len: usize,
        /// Width of the target field.
        capacity: usize,
    },

    /// Risk score outside of `0..=10`.
    #[error("Risk score must be in 0..10 range (got {0})")]
    RiskOutOfRange(u8),

    /// A wire enumeration value has no matching variant.
    #[error("Unknown {kind}: {value}")]
    UnknownVariant {
        /// Enumeration name (e.g. "reporter role").
        kind: &'static str,
        /// The rejected wire value.
        value: String,
    },

    /// Record bytes do not match the expected layout.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Invalid hex encoding.
    #[error("Invalid hex encoding")]
    InvalidHex,
}

/// Result type alias for CoreError.
pub type Result<T> = std::result::Result<T, CoreError>;
