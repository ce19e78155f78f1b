//! # Error Types
//!
//! Errors raised while constructing or parsing core values. Higher layers
//! (wizard validation, API transport) define their own enums and wrap these
//! where needed.

use thiserror::Error;

/// Top-level error type for `cs-core`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A timestamp string or epoch value could not be interpreted.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A communication medium name is not one of the fixed set.
    #[error("unknown communication medium {0:?}")]
    UnknownMedium(String),

    /// A language code is not supported for certificate documents.
    #[error("unsupported certificate language {0:?}")]
    UnknownLanguage(String),

    /// An identifier was empty.
    #[error("{kind} identifier must not be empty")]
    EmptyIdentifier {
        /// Which identifier namespace was empty.
        kind: &'static str,
    },
}
