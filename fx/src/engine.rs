//! Main rate engine implementation.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use ratewatch_common::time::constants;
use ratewatch_common::{previous_day, today, CurrencyPair, RateDate, RatePoint, RateSeries};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::FxConfig;
use crate::error::{FxError, FxResult};
use crate::fetcher::{DailyChange, RateFetcher};
use crate::metrics::{derive_metrics, DerivedMetrics};
use crate::news::{NewsArticle, NewsLookup, NoNews};
use crate::series::{SeriesBuilder, SeriesConfig};
use crate::transport::{HttpTransport, ReqwestTransport};

/// A request to analyze a pair over a trailing window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairQuery {
    pub pair: CurrencyPair,
    pub window_days: u32,
}

impl PairQuery {
    /// Create a new query.
    pub fn new(pair: CurrencyPair, window_days: u32) -> Self {
        Self { pair, window_days }
    }

    /// Pick the query to run: the one just submitted, otherwise the last
    /// one the caller ran. `None` means there is nothing to show yet.
    pub fn resolve(submitted: Option<PairQuery>, last: Option<&PairQuery>) -> Option<PairQuery> {
        submitted.or_else(|| last.cloned())
    }
}

/// Whether the history window produced anything to derive metrics from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HistoryOutcome {
    Available(DerivedMetrics),
    /// No day in the window had a rate.
    Insufficient,
}

impl HistoryOutcome {
    pub fn metrics(&self) -> Option<&DerivedMetrics> {
        match self {
            HistoryOutcome::Available(metrics) => Some(metrics),
            HistoryOutcome::Insufficient => None,
        }
    }
}

/// Everything a presentation layer needs to render one pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairAnalysis {
    /// Analysis ID, for correlating log lines.
    pub id: Uuid,
    pub pair: CurrencyPair,
    pub window_days: u32,
    pub generated_at: DateTime<Utc>,
    /// Latest published rate.
    pub current: RatePoint,
    /// Change from the previous day, when both days are available.
    pub daily_change: Option<DailyChange>,
    pub series: RateSeries,
    pub history: HistoryOutcome,
    /// Passed through from the news collaborator.
    pub news: Vec<NewsArticle>,
}

/// The rate engine.
pub struct RateEngine {
    fetcher: Arc<RateFetcher>,
    builder: SeriesBuilder,
    news: Arc<dyn NewsLookup>,
    config: FxConfig,
}

impl RateEngine {
    /// Create an engine talking to the network.
    pub fn new(config: FxConfig) -> FxResult<Self> {
        config.validate().map_err(FxError::InvalidConfiguration)?;
        let transport = ReqwestTransport::new(config.request_timeout, &config.user_agent)?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    /// Create an engine over a custom transport.
    pub fn with_transport(transport: Arc<dyn HttpTransport>, config: FxConfig) -> Self {
        let fetcher = Arc::new(RateFetcher::new(transport, config.endpoints.clone()));
        let builder = SeriesBuilder::with_config(
            fetcher.clone(),
            SeriesConfig {
                max_concurrency: config.max_concurrency,
            },
        );

        Self {
            fetcher,
            builder,
            news: Arc::new(NoNews),
            config,
        }
    }

    /// Use `news` as the news collaborator.
    pub fn with_news(mut self, news: Arc<dyn NewsLookup>) -> Self {
        self.news = news;
        self
    }

    pub fn config(&self) -> &FxConfig {
        &self.config
    }

    /// Query for `pair` over the configured default window.
    pub fn query(&self, pair: CurrencyPair) -> PairQuery {
        PairQuery::new(pair, self.config.window_days)
    }

    /// Get the latest rate for a pair.
    pub async fn current_rate(&self, pair: &CurrencyPair) -> FxResult<RatePoint> {
        self.fetcher
            .fetch_rate(pair, RateDate::Latest)
            .await
            .into_point()
            .ok_or_else(|| FxError::RateNotAvailable(pair.clone()))
    }

    /// Get the series and its metrics for the trailing window.
    ///
    /// An empty window is reported as [`FxError::InsufficientData`].
    pub async fn history(
        &self,
        pair: &CurrencyPair,
        window_days: u32,
    ) -> FxResult<(RateSeries, DerivedMetrics)> {
        check_window(window_days)?;
        let series = self.builder.build_series(pair, window_days).await;
        if series.is_empty() {
            return Err(FxError::InsufficientData {
                pair: pair.clone(),
                window_days,
            });
        }
        let metrics = derive_metrics(&series)?;
        Ok((series, metrics))
    }

    /// Analyze a pair as of today.
    pub async fn analyze(&self, query: &PairQuery) -> FxResult<PairAnalysis> {
        self.analyze_at(query, today()).await
    }

    /// Analyze a pair with an explicit "today".
    #[instrument(skip(self, query), fields(pair = %query.pair, window_days = query.window_days))]
    pub async fn analyze_at(&self, query: &PairQuery, anchor: NaiveDate) -> FxResult<PairAnalysis> {
        check_window(query.window_days)?;
        let id = Uuid::now_v7();
        let pair = &query.pair;

        let current = self.current_rate(pair).await?;

        let daily_change = self
            .fetcher
            .fetch_rate(pair, RateDate::On(previous_day(anchor)))
            .await
            .into_point()
            .and_then(|previous| match DailyChange::between(previous, current) {
                Ok(change) => Some(change),
                Err(e) => {
                    debug!(analysis_id = %id, error = %e, "Skipping day-over-day comparison");
                    None
                }
            });

        let series = self
            .builder
            .build_series_until(pair, query.window_days, anchor)
            .await;

        let history = match derive_metrics(&series) {
            Ok(metrics) => HistoryOutcome::Available(metrics),
            Err(e) if e.is_insufficient_data() => {
                debug!(analysis_id = %id, "No history available for window");
                HistoryOutcome::Insufficient
            }
            Err(e) => return Err(e),
        };

        let news = self.news.lookup(pair).await;

        info!(
            analysis_id = %id,
            current = %current.rate,
            points = series.len(),
            articles = news.len(),
            news_source = self.news.name(),
            "Analysis completed"
        );

        Ok(PairAnalysis {
            id,
            pair: pair.clone(),
            window_days: query.window_days,
            generated_at: Utc::now(),
            current,
            daily_change,
            series,
            history,
            news,
        })
    }
}

fn check_window(window_days: u32) -> FxResult<()> {
    if window_days > constants::MAX_WINDOW_DAYS {
        return Err(FxError::InvalidConfiguration(format!(
            "History window of {} days exceeds the maximum of {}",
            window_days,
            constants::MAX_WINDOW_DAYS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::SourceEndpoints;
    use crate::transport::MockTransport;
    use async_trait::async_trait;
    use ratewatch_common::Currency;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn usd_eur() -> CurrencyPair {
        CurrencyPair::new(Currency::usd(), Currency::eur())
    }

    fn publish(transport: &MockTransport, date: RateDate, body_date: &str, eur: &str) {
        let url = SourceEndpoints::default().primary_url(&Currency::usd(), date);
        transport.respond_ok(
            url,
            format!(r#"{{"date":"{}","usd":{{"eur":{}}}}}"#, body_date, eur),
        );
    }

    fn setup_engine() -> (Arc<MockTransport>, RateEngine) {
        let transport = Arc::new(MockTransport::new());
        publish(&transport, RateDate::Latest, "2024-03-10", "1.1");
        publish(&transport, RateDate::On(day(7)), "2024-03-07", "1.0");
        publish(&transport, RateDate::On(day(9)), "2024-03-09", "1.0");

        let config = FxConfig {
            window_days: 3,
            ..Default::default()
        };
        let engine = RateEngine::with_transport(transport.clone(), config);
        (transport, engine)
    }

    struct FixedNews;

    #[async_trait]
    impl NewsLookup for FixedNews {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn lookup(&self, pair: &CurrencyPair) -> Vec<NewsArticle> {
            vec![NewsArticle {
                title: format!("{} steady", pair),
                source: "Wire".into(),
                date: "2024-03-10".into(),
                summary: "Quiet session.".into(),
                url: "https://news.test/1".into(),
            }]
        }
    }

    #[tokio::test]
    async fn test_analyze() {
        let (_, engine) = setup_engine();
        let engine = engine.with_news(Arc::new(FixedNews));
        let query = engine.query(usd_eur());

        let analysis = engine.analyze_at(&query, day(10)).await.unwrap();

        assert_eq!(analysis.current.rate, dec!(1.1));
        assert_eq!(analysis.current.date, day(10));

        let change = analysis.daily_change.unwrap();
        assert_eq!(change.previous.date, day(9));
        assert_eq!(change.percent_change, dec!(10));

        // day 8 is missing and silently skipped
        assert_eq!(analysis.series.dates(), vec![day(7), day(9)]);

        let metrics = analysis.history.metrics().unwrap();
        assert_eq!(metrics.point_count, 2);
        assert_eq!(metrics.overall_change_pct, dec!(0));

        assert_eq!(analysis.news.len(), 1);
        assert_eq!(analysis.news[0].title, "USD/EUR steady");
    }

    #[tokio::test]
    async fn test_analyze_without_current_rate() {
        let transport = Arc::new(MockTransport::new());
        let engine = RateEngine::with_transport(transport.clone(), FxConfig::default());
        let query = engine.query(usd_eur());

        let result = engine.analyze_at(&query, day(10)).await;

        assert!(matches!(result, Err(FxError::RateNotAvailable(_))));
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_analyze_with_empty_history() {
        let transport = Arc::new(MockTransport::new());
        publish(&transport, RateDate::Latest, "2024-03-20", "0.92");
        let engine = RateEngine::with_transport(transport, FxConfig::default());
        let query = PairQuery::new(usd_eur(), 5);

        let analysis = engine.analyze_at(&query, day(20)).await.unwrap();

        assert!(analysis.daily_change.is_none());
        assert!(analysis.series.is_empty());
        assert_eq!(analysis.history, HistoryOutcome::Insufficient);
        assert!(analysis.news.is_empty());
    }

    #[tokio::test]
    async fn test_current_rate() {
        let (_, engine) = setup_engine();

        let current = engine.current_rate(&usd_eur()).await.unwrap();
        assert_eq!(current.rate, dec!(1.1));

        let missing = engine
            .current_rate(&CurrencyPair::new(Currency::gbp(), Currency::jpy()))
            .await;
        assert!(matches!(missing, Err(FxError::RateNotAvailable(_))));
    }

    #[test]
    fn test_daily_change_blocking() {
        let (transport, engine) = setup_engine();
        let pair = usd_eur();

        let change = tokio_test::block_on(engine.fetcher.compare_with_previous_day_from(&pair, day(10)));

        assert_eq!(change.map(|c| c.change), Some(dec!(0.1)));
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_history_over_populated_window() {
        let transport = Arc::new(MockTransport::new());
        let anchor = today();
        for (offset, rate) in [(3, "0.90"), (1, "0.99")] {
            let date = anchor - chrono::Duration::days(offset);
            publish(&transport, RateDate::On(date), &date.to_string(), rate);
        }
        let engine = RateEngine::with_transport(transport.clone(), FxConfig::default());

        let (series, metrics) = engine.history(&usd_eur(), 3).await.unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(metrics.overall_change_pct, dec!(10));
        // the unpublished middle day also hits the fallback
        assert_eq!(transport.request_count(), 4);
    }

    #[tokio::test]
    async fn test_history_over_empty_window() {
        let transport = Arc::new(MockTransport::new());
        let engine = RateEngine::with_transport(transport.clone(), FxConfig::default());

        let result = engine.history(&usd_eur(), 4).await;

        match result {
            Err(FxError::InsufficientData { pair, window_days }) => {
                assert_eq!(pair, usd_eur());
                assert_eq!(window_days, 4);
            }
            other => panic!("unexpected result: {:?}", other.map(|(s, _)| s.len())),
        }
        // primary and fallback for each day
        assert_eq!(transport.request_count(), 8);
    }

    #[tokio::test]
    async fn test_oversized_window_rejected() {
        let transport = Arc::new(MockTransport::new());
        let engine = RateEngine::with_transport(transport.clone(), FxConfig::default());
        let too_long = constants::MAX_WINDOW_DAYS + 1;

        let analysis = engine
            .analyze_at(&PairQuery::new(usd_eur(), too_long), day(10))
            .await;
        assert!(matches!(analysis, Err(FxError::InvalidConfiguration(_))));

        let history = engine.history(&usd_eur(), u32::MAX).await;
        assert!(matches!(history, Err(FxError::InvalidConfiguration(_))));

        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_analyze_skips_overflowing_daily_change() {
        let transport = Arc::new(MockTransport::new());
        publish(&transport, RateDate::Latest, "2024-03-10", "100000000000000000000");
        publish(&transport, RateDate::On(day(9)), "2024-03-09", "0.00000000000000000001");
        let engine = RateEngine::with_transport(transport, FxConfig::default());

        let analysis = engine
            .analyze_at(&PairQuery::new(usd_eur(), 1), day(10))
            .await
            .unwrap();

        assert!(analysis.daily_change.is_none());
        assert_eq!(analysis.series.len(), 1);
    }

    #[test]
    fn test_query_resolution() {
        let last = PairQuery::new(usd_eur(), 30);
        let submitted = PairQuery::new(CurrencyPair::new(Currency::gbp(), Currency::usd()), 7);

        assert_eq!(
            PairQuery::resolve(Some(submitted.clone()), Some(&last)),
            Some(submitted)
        );
        assert_eq!(PairQuery::resolve(None, Some(&last)), Some(last));
        assert_eq!(PairQuery::resolve(None, None), None);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = FxConfig {
            window_days: 0,
            ..Default::default()
        };
        assert!(matches!(
            RateEngine::new(config),
            Err(FxError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_history_outcome_serialization() {
        let json = serde_json::to_value(&HistoryOutcome::Insufficient).unwrap();
        assert_eq!(json["status"], "insufficient");
    }
}
