//! CGATS error types.

use thiserror::Error;

/// Result type for CGATS operations.
pub type CgatsResult<T> = Result<T, CgatsError>;

/// Errors that can occur while reading, querying or mutating CGATS data.
///
/// The variants form a closed family. Code that loads a file speculatively
/// ("is this usable calibration data?") treats every variant as "not
/// applicable" and logs a warning instead of failing.
#[derive(Debug, Error)]
pub enum CgatsError {
    /// The text could not be tokenized as CGATS at all.
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    /// Well-formed tokens that violate the document structure
    /// (unknown fields, wrong nesting).
    #[error("{0}")]
    Structural(String),

    /// Section is internally inconsistent (missing or wrong `NUMBER_OF_SETS`,
    /// missing `DATA_FORMAT`).
    #[error("invalid CGATS: {0}")]
    Invalid(String),

    /// A required field or keyword is absent.
    #[error("missing key: {0}")]
    MissingKey(String),

    /// A value has the wrong type for the requested access.
    #[error("type error: {0}")]
    Type(String),

    /// A value could not be interpreted.
    #[error("value error: {0}")]
    Value(String),

    /// The requested mutation is not possible on this document.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CgatsError {
    /// Creates a [`CgatsError::Parse`] error.
    #[inline]
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Returns `true` for errors caused by the data itself rather than I/O.
    #[inline]
    pub fn is_data_error(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}
