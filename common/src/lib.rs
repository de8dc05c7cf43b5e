//! RateWatch Common Types
//!
//! This crate contains shared types used across RateWatch, including
//! currency codes, rate observations, date-ordered series and calendar
//! helpers.

pub mod currency;
pub mod series;
pub mod error;
pub mod time;

pub use currency::*;
pub use series::*;
pub use error::*;
pub use time::{previous_day, today, trailing_window, RateDate};
