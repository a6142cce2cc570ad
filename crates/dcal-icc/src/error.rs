//! ICC error types.

use thiserror::Error;

/// Result type for ICC operations.
pub type IccResult<T> = Result<T, IccError>;

/// Errors that can occur while reading or writing profiles.
#[derive(Debug, Error)]
pub enum IccError {
    /// Data ended before a structure was complete.
    #[error("truncated {what}: need {needed} bytes, have {available}")]
    Truncated {
        /// Structure being read.
        what: &'static str,
        /// Bytes required.
        needed: usize,
        /// Bytes available.
        available: usize,
    },

    /// Invalid profile data.
    #[error("invalid profile data: {0}")]
    InvalidProfile(String),

    /// Tag data that could not be decoded.
    #[error("invalid '{signature}' tag: {reason}")]
    InvalidTag {
        /// Tag signature.
        signature: String,
        /// What went wrong.
        reason: String,
    },

    /// Embedded XML could not be parsed.
    #[error("XML error: {0}")]
    Xml(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IccError {
    pub(crate) fn invalid_tag(signature: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        Self::InvalidTag {
            signature: signature.to_string(),
            reason: reason.into(),
        }
    }
}
