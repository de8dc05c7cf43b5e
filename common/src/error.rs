//! Error types shared across RateWatch crates.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for domain validation in RateWatch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RateWatchError {
    /// Currency code is not three ASCII letters.
    #[error("Invalid currency code: {0:?}")]
    InvalidCurrency(String),

    /// Exchange rates must be strictly positive.
    #[error("Non-positive rate {rate} on {date}")]
    NonPositiveRate { date: NaiveDate, rate: Decimal },

    /// A point was appended at or before the last date of a series.
    #[error("Out of order point: {date} does not follow {last}")]
    OutOfOrder { date: NaiveDate, last: NaiveDate },
}

impl RateWatchError {
    /// Get a stable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            RateWatchError::InvalidCurrency(_) => "INVALID_CURRENCY",
            RateWatchError::NonPositiveRate { .. } => "NON_POSITIVE_RATE",
            RateWatchError::OutOfOrder { .. } => "OUT_OF_ORDER",
        }
    }
}

/// Result type alias for RateWatch domain operations.
pub type Result<T> = std::result::Result<T, RateWatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            RateWatchError::InvalidCurrency("US".into()).error_code(),
            "INVALID_CURRENCY"
        );
        assert_eq!(
            RateWatchError::OutOfOrder {
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                last: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            }
            .error_code(),
            "OUT_OF_ORDER"
        );
    }

    #[test]
    fn test_error_display() {
        let err = RateWatchError::InvalidCurrency("U5D".into());
        assert_eq!(err.to_string(), "Invalid currency code: \"U5D\"");
    }
}
