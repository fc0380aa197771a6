//! Engine error taxonomy
//!
//! Every variant is detected at the engine boundary before any computation
//! runs, so a caller either gets a fully populated prediction or one of these.

use thiserror::Error;

/// Errors surfaced by the forecast engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    /// The requested instant is not strictly in the future (or resolves to
    /// zero or fewer steps). Asking again with the same target will not help.
    #[error("invalid horizon: {steps} steps ahead (target must be in the future)")]
    InvalidHorizon { steps: i64 },

    /// Not enough history for the configured windows. Callers should fetch a
    /// longer series rather than pick a different target time.
    #[error("insufficient data: need at least {required} prices, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("malformed series at index {index}: {reason}")]
    MalformedSeries { index: usize, reason: String },

    #[error("invalid target price: {0}")]
    InvalidTarget(f64),
}

impl ForecastError {
    pub(crate) fn malformed(index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedSeries {
            index,
            reason: reason.into(),
        }
    }
}

pub type EngineResult<T> = Result<T, ForecastError>;
