//! Calibration error types.

use dcal_cgats::CgatsError;
use dcal_icc::IccError;
use thiserror::Error;

/// Result type for calibration operations.
pub type CalResult<T> = Result<T, CalError>;

/// Errors that can occur while recovering or converting calibration data.
#[derive(Debug, Error)]
pub enum CalError {
    /// The profile carries neither an embedded CAL nor a `vcgt`.
    #[error("profile has no calibration data (no embedded CAL and no vcgt)")]
    NoCalibration,

    /// A calibration candidate was found but could not be turned into a CAL.
    #[error("calibration extraction failed")]
    ExtractionFailed {
        /// Underlying parse or I/O failure.
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Curve data that cannot be represented (e.g. no entries).
    #[error("invalid calibration curve: {0}")]
    InvalidCurve(String),

    /// CGATS error.
    #[error(transparent)]
    Cgats(#[from] CgatsError),

    /// ICC error.
    #[error(transparent)]
    Icc(#[from] IccError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CalError {
    pub(crate) fn extraction<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ExtractionFailed {
            source: Box::new(err),
        }
    }
}
