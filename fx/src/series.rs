//! Trailing-window series assembly.

use chrono::NaiveDate;
use futures::future;
use futures::stream::{self, StreamExt};
use ratewatch_common::{today, trailing_window, CurrencyPair, RateDate, RatePoint, RateSeries};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::fetcher::RateFetcher;

/// Configuration for series building.
#[derive(Debug, Clone)]
pub struct SeriesConfig {
    /// Day fetches allowed in flight at once. `1` fetches strictly in
    /// date order, one at a time.
    pub max_concurrency: usize,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self { max_concurrency: 1 }
    }
}

/// Drives a [`RateFetcher`] across a window of days.
pub struct SeriesBuilder {
    fetcher: Arc<RateFetcher>,
    config: SeriesConfig,
}

impl SeriesBuilder {
    /// Create a sequential series builder.
    pub fn new(fetcher: Arc<RateFetcher>) -> Self {
        Self::with_config(fetcher, SeriesConfig::default())
    }

    /// Create a series builder with custom configuration.
    pub fn with_config(fetcher: Arc<RateFetcher>, config: SeriesConfig) -> Self {
        Self { fetcher, config }
    }

    /// Build the series for the `window_days` days before today.
    pub async fn build_series(&self, pair: &CurrencyPair, window_days: u32) -> RateSeries {
        self.build_series_until(pair, window_days, today()).await
    }

    /// Build the series for the `window_days` days before `anchor`.
    ///
    /// Issues exactly one fetch per day. Days without a rate are left
    /// out, so the result may be shorter than the window or empty.
    #[instrument(skip(self, pair), fields(pair = %pair))]
    pub async fn build_series_until(
        &self,
        pair: &CurrencyPair,
        window_days: u32,
        anchor: NaiveDate,
    ) -> RateSeries {
        let dates = trailing_window(anchor, window_days);

        let points: Vec<RatePoint> = if self.config.max_concurrency <= 1 {
            let mut points = Vec::with_capacity(dates.len());
            for date in dates {
                if let Some(point) = self.fetch_day(pair, date).await {
                    points.push(point);
                }
            }
            points
        } else {
            stream::iter(dates)
                .map(|date| self.fetch_day(pair, date))
                .buffered(self.config.max_concurrency)
                .filter_map(future::ready)
                .collect::<Vec<_>>()
                .await
        };

        let series = RateSeries::from_points(points);
        debug!(points = series.len(), "Series built");
        series
    }

    async fn fetch_day(&self, pair: &CurrencyPair, date: NaiveDate) -> Option<RatePoint> {
        self.fetcher
            .fetch_rate(pair, RateDate::On(date))
            .await
            .into_point()
    }
}
