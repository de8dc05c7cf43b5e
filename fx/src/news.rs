//! News collaborator seam.
//!
//! The engine does not produce news. It passes the pair to a
//! [`NewsLookup`] and forwards whatever comes back.

use async_trait::async_trait;
use ratewatch_common::CurrencyPair;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// A news item about a currency pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    #[serde(default = "defaults::title")]
    pub title: String,
    #[serde(default = "defaults::source")]
    pub source: String,
    #[serde(default = "defaults::date")]
    pub date: String,
    #[serde(default = "defaults::summary")]
    pub summary: String,
    #[serde(default = "defaults::url")]
    pub url: String,
}

mod defaults {
    pub fn title() -> String {
        "No Title".to_string()
    }

    pub fn source() -> String {
        "Unknown Source".to_string()
    }

    pub fn date() -> String {
        "Recent".to_string()
    }

    pub fn summary() -> String {
        "No summary available".to_string()
    }

    pub fn url() -> String {
        "#".to_string()
    }
}

/// Trait for news collaborators.
#[async_trait]
pub trait NewsLookup: Send + Sync {
    /// Get the collaborator name.
    fn name(&self) -> &str;

    /// Articles relevant to `pair`. Failures yield an empty list.
    async fn lookup(&self, pair: &CurrencyPair) -> Vec<NewsArticle>;
}

/// Collaborator that never has news.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoNews;

#[async_trait]
impl NewsLookup for NoNews {
    fn name(&self) -> &str {
        "none"
    }

    async fn lookup(&self, _pair: &CurrencyPair) -> Vec<NewsArticle> {
        Vec::new()
    }
}

/// Collaborator reading a prepared news document from disk.
///
/// The document may be a bare JSON array or text containing a fenced
/// ```` ```json ```` block, as produced by search-backed summarizers.
#[derive(Debug, Clone)]
pub struct FileNewsLookup {
    path: PathBuf,
}

impl FileNewsLookup {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl NewsLookup for FileNewsLookup {
    fn name(&self) -> &str {
        "file"
    }

    async fn lookup(&self, pair: &CurrencyPair) -> Vec<NewsArticle> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => parse_news_payload(&text),
            Err(e) => {
                warn!(path = %self.path.display(), pair = %pair, error = %e, "Failed to read news document");
                Vec::new()
            }
        }
    }
}

/// Parse a news document into articles.
///
/// Never fails: unparseable input yields an empty list.
pub fn parse_news_payload(text: &str) -> Vec<NewsArticle> {
    let candidate = fenced_json(text).unwrap_or(text).trim();

    match serde_json::from_str::<Vec<NewsArticle>>(candidate) {
        Ok(articles) => articles,
        Err(e) => {
            warn!(error = %e, "Failed to parse news response");
            Vec::new()
        }
    }
}

fn fenced_json(text: &str) -> Option<&str> {
    const OPEN: &str = "```json";
    let start = text.find(OPEN)? + OPEN.len();
    let end = text.rfind("```")?;
    (end > start).then(|| &text[start..end])
}
