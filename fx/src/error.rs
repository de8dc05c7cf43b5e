//! FX engine error types.

use ratewatch_common::{CurrencyPair, RateDate, RateWatchError};
use thiserror::Error;

/// Errors that can occur in the FX engine.
#[derive(Debug, Error)]
pub enum FxError {
    /// The request never produced an HTTP response.
    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// The source answered with a non-success status.
    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    /// The body was not the expected JSON document.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// The body parsed but did not contain the requested rate.
    #[error("Rate for {pair} missing from payload ({date})")]
    MissingRate { pair: CurrencyPair, date: RateDate },

    /// Rate not available for the requested currency pair.
    #[error("Rate not available for {0}")]
    RateNotAvailable(CurrencyPair),

    /// No valid points in the requested window.
    #[error("No data available for {pair} over the last {window_days} days")]
    InsufficientData { pair: CurrencyPair, window_days: u32 },

    /// Derivation needs at least one point.
    #[error("Insufficient data: series is empty")]
    EmptySeries,

    /// A derived figure does not fit in a `Decimal`.
    #[error("Arithmetic overflow computing {0}")]
    ArithmeticOverflow(&'static str),

    /// Invalid engine configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Domain validation failure.
    #[error(transparent)]
    Domain(#[from] RateWatchError),
}

impl FxError {
    /// Whether this error is a per-request fetch failure that is
    /// recovered locally as an absent rate.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            FxError::Transport { .. }
                | FxError::Status { .. }
                | FxError::MalformedPayload(_)
                | FxError::MissingRate { .. }
                | FxError::Domain(RateWatchError::NonPositiveRate { .. })
        )
    }

    /// Whether this error means no usable data rather than a fault.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, FxError::InsufficientData { .. } | FxError::EmptySeries)
    }
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;
