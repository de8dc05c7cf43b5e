//! Calendar utilities and constants for rate retrieval.

use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Retrieval defaults.
pub mod constants {
    use rust_decimal::Decimal;
    use std::time::Duration;

    /// Default trailing window for history (30 days).
    pub const DEFAULT_WINDOW_DAYS: u32 = 30;

    /// Longest accepted history window (one year).
    pub const MAX_WINDOW_DAYS: u32 = 366;

    /// Default per-request timeout (15 seconds).
    pub fn default_request_timeout() -> Duration {
        Duration::from_secs(15)
    }

    /// Lower display bound factor (0.2% below the minimum).
    pub fn range_lower_padding() -> Decimal {
        Decimal::new(998, 3)
    }

    /// Upper display bound factor (0.2% above the maximum).
    pub fn range_upper_padding() -> Decimal {
        Decimal::new(1002, 3)
    }
}

/// Which day a rate is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateDate {
    /// Most recent rate the source publishes.
    Latest,
    /// Rate published for a specific calendar day.
    On(NaiveDate),
}

impl RateDate {
    /// Path segment selecting this snapshot at the rate source.
    pub fn version_segment(&self) -> String {
        match self {
            RateDate::Latest => "latest".to_string(),
            RateDate::On(date) => date.format("%Y-%m-%d").to_string(),
        }
    }
}

impl fmt::Display for RateDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.version_segment())
    }
}

/// Current UTC calendar date.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// The `days` calendar dates strictly before `anchor`, oldest first.
///
/// The window is cut short at the earliest representable date.
pub fn trailing_window(anchor: NaiveDate, days: u32) -> Vec<NaiveDate> {
    let start = anchor
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN);
    start.iter_days().take_while(|date| *date < anchor).collect()
}

/// The calendar day before `date`, saturating at the earliest
/// representable date.
pub fn previous_day(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(NaiveDate::MIN)
}
