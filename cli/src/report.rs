//! Rendering of pair analyses for the terminal.

use std::fmt::Write;

use ratewatch_fx::{DailyChange, HistoryOutcome, PairAnalysis};
use rust_decimal::Decimal;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Render an analysis in the requested format.
pub fn render(analysis: &PairAnalysis, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(analysis)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(analysis)?),
    }
}

fn signed(value: Decimal, places: usize) -> String {
    let sign = if value >= Decimal::ZERO { "+" } else { "" };
    format!("{}{:.*}", sign, places, value.round_dp(places as u32))
}

fn render_change(change: &DailyChange) -> String {
    format!(
        "{} ({}%) from yesterday",
        signed(change.change, 6),
        signed(change.percent_change, 2)
    )
}

/// Human-readable report.
pub fn render_text(analysis: &PairAnalysis) -> String {
    let pair = &analysis.pair;
    let mut out = String::new();

    let _ = writeln!(out, "{} exchange rate", pair);
    let _ = writeln!(
        out,
        "1 {} = {:.6} {}",
        pair.base,
        analysis.current.rate.round_dp(6),
        pair.quote
    );
    if let Some(change) = &analysis.daily_change {
        let _ = writeln!(out, "{}", render_change(change));
    }
    let _ = writeln!(
        out,
        "Rate date: {} (generated {} UTC)",
        analysis.current.date,
        analysis.generated_at.format("%Y-%m-%d %H:%M")
    );
    out.push('\n');

    match &analysis.history {
        HistoryOutcome::Available(metrics) => {
            let places = metrics.display_precision() as usize;
            let _ = writeln!(out, "{}", metrics.headline());
            let _ = writeln!(
                out,
                "Range: {:.*} .. {:.*} {} per {}",
                places,
                metrics.range_bounds.lower.round_dp(places as u32),
                places,
                metrics.range_bounds.upper.round_dp(places as u32),
                pair.quote,
                pair.base
            );
            let _ = writeln!(out, "{:<12} {:>14} {:>9}", "Date", "Rate", "Change");
            for (point, pct) in analysis.series.iter().zip(&metrics.percent_change) {
                let _ = writeln!(
                    out,
                    "{:<12} {:>14.*} {:>8}%",
                    point.date.to_string(),
                    places,
                    point.rate.round_dp(places as u32),
                    signed(*pct, 2)
                );
            }
        }
        HistoryOutcome::Insufficient => {
            let _ = writeln!(
                out,
                "Could not retrieve sufficient historical data for the last {} days",
                analysis.window_days
            );
        }
    }
    out.push('\n');

    let _ = writeln!(out, "Market insights: {}", pair);
    if analysis.news.is_empty() {
        let _ = writeln!(out, "No recent news articles found for these currencies.");
    }
    for article in &analysis.news {
        let _ = writeln!(out, "- {} ({}, {})", article.title, article.source, article.date);
        let _ = writeln!(out, "  {}", article.summary);
        let _ = writeln!(out, "  {}", article.url);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use ratewatch_common::{Currency, CurrencyPair, RatePoint, RateSeries};
    use ratewatch_fx::{derive_metrics, NewsArticle};
    use rust_decimal_macros::dec;

    fn point(d: u32, rate: Decimal) -> RatePoint {
        RatePoint::new(NaiveDate::from_ymd_opt(2024, 3, d).unwrap(), rate).unwrap()
    }

    fn analysis(series: RateSeries) -> PairAnalysis {
        let history = match derive_metrics(&series) {
            Ok(metrics) => HistoryOutcome::Available(metrics),
            Err(_) => HistoryOutcome::Insufficient,
        };
        let current = point(10, dec!(0.925));
        PairAnalysis {
            id: uuid::Uuid::now_v7(),
            pair: CurrencyPair::new(Currency::usd(), Currency::eur()),
            window_days: 3,
            generated_at: Utc::now(),
            current,
            daily_change: Some(DailyChange::between(point(9, dec!(0.93)), current).unwrap()),
            series,
            history,
            news: Vec::new(),
        }
    }

    #[test]
    fn test_render_text_with_history() {
        let series = RateSeries::from_points(vec![
            point(7, dec!(0.92)),
            point(8, dec!(0.9246)),
            point(9, dec!(0.93)),
        ]);

        let text = render_text(&analysis(series));

        assert!(text.contains("1 USD = 0.925000 EUR"));
        assert!(text.contains("-0.005000 (-0.54%) from yesterday"));
        assert!(text.contains("↑ 1.09% in 3 days"));
        assert!(text.contains("2024-03-08"));
        assert!(text.contains("+0.50%"));
        assert!(text.contains("No recent news articles"));
    }

    #[test]
    fn test_render_text_without_history() {
        let mut analysis = analysis(RateSeries::new());
        analysis.news.push(NewsArticle {
            title: "ECB holds".into(),
            source: "Wire".into(),
            date: "2024-03-09".into(),
            summary: "Rates unchanged.".into(),
            url: "https://news.test/ecb".into(),
        });

        let text = render_text(&analysis);

        assert!(text.contains("Could not retrieve sufficient historical data for the last 3 days"));
        assert!(text.contains("- ECB holds (Wire, 2024-03-09)"));
    }

    #[tokio::test]
    async fn test_render_engine_analysis() {
        use ratewatch_common::RateDate;
        use ratewatch_fx::{FxConfig, MockTransport, PairQuery, RateEngine, SourceEndpoints};
        use std::sync::Arc;

        let transport = Arc::new(MockTransport::new());
        let endpoints = SourceEndpoints::default();
        transport.respond_ok(
            endpoints.fallback_url(&Currency::gbp(), RateDate::Latest),
            r#"{"date":"2024-03-10","gbp":{"usd":1.2712}}"#,
        );
        let engine = RateEngine::with_transport(transport, FxConfig::default());
        let query = PairQuery::new(CurrencyPair::new(Currency::gbp(), Currency::usd()), 2);

        let analysis = engine
            .analyze_at(&query, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap())
            .await
            .unwrap();
        let text = render_text(&analysis);

        assert!(text.contains("1 GBP = 1.271200 USD"));
        assert!(!text.contains("from yesterday"));
        assert!(text.contains("for the last 2 days"));
    }

    #[test]
    fn test_render_json() {
        let series = RateSeries::from_points(vec![point(9, dec!(0.93))]);
        let json = render(&analysis(series), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["pair"]["base"], "USD");
        assert_eq!(value["history"]["status"], "available");
        assert_eq!(value["history"]["point_count"], 1);
    }
}
