//! Trend metrics derived from a rate series.

use chrono::NaiveDate;
use ratewatch_common::time::constants;
use ratewatch_common::RateSeries;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FxError, FxResult};

/// Net direction of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Unchanged,
}

impl Direction {
    /// Classify a signed change.
    pub fn of(change: Decimal) -> Self {
        if change > Decimal::ZERO {
            Direction::Up
        } else if change < Decimal::ZERO {
            Direction::Down
        } else {
            Direction::Unchanged
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Up => "↑",
            Direction::Down => "↓",
            Direction::Unchanged => "→",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Unchanged => "unchanged",
        };
        f.write_str(name)
    }
}

/// Padded display bounds around the observed rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeBounds {
    pub lower: Decimal,
    pub upper: Decimal,
}

impl RangeBounds {
    pub fn span(&self) -> Decimal {
        self.upper - self.lower
    }
}

/// Step between two consecutive points of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMove {
    /// Date of the later point.
    pub date: NaiveDate,
    pub from: Decimal,
    pub to: Decimal,
    /// Whether the rate did not fall.
    pub rising: bool,
}

/// Metrics computed from a non-empty series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Change of each point relative to the first point, in percent.
    pub percent_change: Vec<Decimal>,
    pub range_bounds: RangeBounds,
    /// Change of the last point relative to the first, in percent.
    pub overall_change_pct: Decimal,
    pub direction: Direction,
    pub daily_moves: Vec<DailyMove>,
    pub point_count: usize,
}

impl DerivedMetrics {
    /// Decimal places to show rates with: finer for narrow ranges.
    pub fn display_precision(&self) -> u32 {
        if self.range_bounds.span() < Decimal::new(1, 1) {
            6
        } else {
            4
        }
    }

    /// One-line summary such as `↑ 1.23% in 30 days`.
    pub fn headline(&self) -> String {
        format!(
            "{} {:.2}% in {} days",
            self.direction.arrow(),
            self.overall_change_pct.abs().round_dp(2),
            self.point_count
        )
    }
}

/// Derive trend metrics from `series`.
///
/// The first point of the series is the baseline, whatever its date.
/// Fails with [`FxError::EmptySeries`] when there is nothing to derive from,
/// and with [`FxError::ArithmeticOverflow`] when the rates span too many
/// orders of magnitude for a percentage to be represented.
pub fn derive_metrics(series: &RateSeries) -> FxResult<DerivedMetrics> {
    let (first, last) = match (series.first(), series.last()) {
        (Some(first), Some(last)) => (first.rate, last.rate),
        _ => return Err(FxError::EmptySeries),
    };

    let relative = |rate: Decimal| percent_of(rate, first);

    let percent_change = series
        .iter()
        .map(|p| relative(p.rate))
        .collect::<FxResult<Vec<_>>>()?;

    let mut min = first;
    let mut max = first;
    for point in series {
        min = min.min(point.rate);
        max = max.max(point.rate);
    }
    let range_bounds = RangeBounds {
        lower: min
            .checked_mul(constants::range_lower_padding())
            .ok_or(FxError::ArithmeticOverflow("range bounds"))?,
        upper: max
            .checked_mul(constants::range_upper_padding())
            .ok_or(FxError::ArithmeticOverflow("range bounds"))?,
    };

    let daily_moves = series
        .points()
        .windows(2)
        .map(|pair| DailyMove {
            date: pair[1].date,
            from: pair[0].rate,
            to: pair[1].rate,
            rising: pair[1].rate >= pair[0].rate,
        })
        .collect();

    let overall_change_pct = relative(last)?;

    Ok(DerivedMetrics {
        percent_change,
        range_bounds,
        overall_change_pct,
        direction: Direction::of(overall_change_pct),
        daily_moves,
        point_count: series.len(),
    })
}

/// `(rate - base) / base * 100`, failing instead of overflowing.
pub(crate) fn percent_of(rate: Decimal, base: Decimal) -> FxResult<Decimal> {
    rate.checked_sub(base)
        .and_then(|change| change.checked_div(base))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or(FxError::ArithmeticOverflow("percent change"))
}
