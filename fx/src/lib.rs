//! RateWatch FX Engine
//!
//! Retrieves daily exchange rates from a public rate source with a
//! fallback mirror and derives trend metrics from the resulting series.
//!
//! # Features
//!
//! - Primary/fallback retrieval with at most two requests per day
//! - Gap-tolerant trailing-window series, sequential or bounded fan-out
//! - Percentage change, padded range bounds and direction of travel
//! - Day-over-day comparison and pass-through of collaborator news
//!
//! # Example
//!
//! ```rust,ignore
//! use ratewatch_common::CurrencyPair;
//! use ratewatch_fx::{FxConfig, RateEngine};
//!
//! let engine = RateEngine::new(FxConfig::default())?;
//! let query = engine.query(CurrencyPair::parse("usd", "eur")?);
//!
//! let analysis = engine.analyze(&query).await?;
//! if let Some(metrics) = analysis.history.metrics() {
//!     println!("{}", metrics.headline());
//! }
//! ```

pub mod config;
pub mod endpoint;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod metrics;
pub mod news;
pub mod series;
pub mod transport;

pub use config::FxConfig;
pub use endpoint::SourceEndpoints;
pub use engine::{HistoryOutcome, PairAnalysis, PairQuery, RateEngine};
pub use error::{FxError, FxResult};
pub use fetcher::{DailyChange, FetchOutcome, RateFetcher};
pub use metrics::{derive_metrics, DailyMove, DerivedMetrics, Direction, RangeBounds};
pub use news::{FileNewsLookup, NewsArticle, NewsLookup, NoNews};
pub use series::{SeriesBuilder, SeriesConfig};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};

#[cfg(any(test, feature = "test-utils"))]
pub use transport::{MockResponse, MockTransport};
