//! Rate observations and date-ordered rate series.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{RateWatchError, Result};

/// One observed exchange rate for a specific day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatePoint {
    /// Day the rate applies to.
    pub date: NaiveDate,
    /// Units of quote currency per unit of base currency. Always positive.
    pub rate: Decimal,
}

impl RatePoint {
    /// Create a new rate point.
    pub fn new(date: NaiveDate, rate: Decimal) -> Result<Self> {
        if rate <= Decimal::ZERO {
            return Err(RateWatchError::NonPositiveRate { date, rate });
        }
        Ok(Self { date, rate })
    }
}

/// Points strictly increasing by date, no duplicate dates.
///
/// An empty series is a valid value meaning "no data available".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSeries {
    points: Vec<RatePoint>,
}

impl RateSeries {
    /// Create an empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from unordered points.
    ///
    /// Points are sorted by date; for duplicate dates the first occurrence wins.
    pub fn from_points(points: impl IntoIterator<Item = RatePoint>) -> Self {
        let mut points: Vec<RatePoint> = points.into_iter().collect();
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
        Self { points }
    }

    /// Append a point after the current last point.
    pub fn push(&mut self, point: RatePoint) -> Result<()> {
        if let Some(last) = self.points.last() {
            if point.date <= last.date {
                return Err(RateWatchError::OutOfOrder {
                    date: point.date,
                    last: last.date,
                });
            }
        }
        self.points.push(point);
        Ok(())
    }

    pub fn points(&self) -> &[RatePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&RatePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&RatePoint> {
        self.points.last()
    }

    /// Dates of all points, oldest first.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Rates of all points, oldest first.
    pub fn rates(&self) -> Vec<Decimal> {
        self.points.iter().map(|p| p.rate).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RatePoint> {
        self.points.iter()
    }
}

impl<'a> IntoIterator for &'a RateSeries {
    type Item = &'a RatePoint;
    type IntoIter = std::slice::Iter<'a, RatePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
