//! Single-day rate retrieval with a fallback mirror.

use chrono::NaiveDate;
use ratewatch_common::{previous_day, today, Currency, CurrencyPair, RateDate, RatePoint};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::endpoint::SourceEndpoints;
use crate::error::{FxError, FxResult};
use crate::metrics::percent_of;
use crate::transport::{HttpResponse, HttpTransport};

/// Result of a single fetch: a rate, or the reason there is none.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The source published a usable rate.
    Present(RatePoint),
    /// No usable rate; the error records why.
    Absent(FxError),
}

impl FetchOutcome {
    pub fn is_present(&self) -> bool {
        matches!(self, FetchOutcome::Present(_))
    }

    /// Discard the failure reason.
    pub fn into_point(self) -> Option<RatePoint> {
        match self {
            FetchOutcome::Present(point) => Some(point),
            FetchOutcome::Absent(_) => None,
        }
    }
}

/// Change between the previous day's rate and the latest rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyChange {
    pub current: RatePoint,
    pub previous: RatePoint,
    /// `current - previous`.
    pub change: Decimal,
    /// `change / previous * 100`.
    pub percent_change: Decimal,
}

impl DailyChange {
    /// Compute the change from `previous` to `current`.
    pub fn between(previous: RatePoint, current: RatePoint) -> FxResult<Self> {
        let change = current
            .rate
            .checked_sub(previous.rate)
            .ok_or(FxError::ArithmeticOverflow("daily change"))?;
        let percent_change = percent_of(current.rate, previous.rate)?;
        Ok(Self {
            current,
            previous,
            change,
            percent_change,
        })
    }

    /// Whether the rate did not fall.
    pub fn is_gain(&self) -> bool {
        self.change >= Decimal::ZERO
    }
}

/// Fetches one day's rate for a pair from the primary endpoint, falling
/// back to the mirror once.
///
/// At most two requests are issued per call and nothing is cached. Any
/// 2xx status counts as success; the mirror is tried after any other
/// status or a transport error, never after a 2xx with a bad body.
pub struct RateFetcher {
    transport: Arc<dyn HttpTransport>,
    endpoints: SourceEndpoints,
}

impl RateFetcher {
    /// Create a new fetcher.
    pub fn new(transport: Arc<dyn HttpTransport>, endpoints: SourceEndpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    pub fn endpoints(&self) -> &SourceEndpoints {
        &self.endpoints
    }

    /// Fetch the rate for `pair` on `date`.
    ///
    /// Failures of any kind come back as [`FetchOutcome::Absent`].
    #[instrument(skip_all, fields(pair = %pair, date = %date))]
    pub async fn fetch_rate(&self, pair: &CurrencyPair, date: RateDate) -> FetchOutcome {
        match self.try_fetch(pair, date).await {
            Ok(point) => {
                debug!(rate = %point.rate, day = %point.date, "Rate fetched");
                FetchOutcome::Present(point)
            }
            Err(e) => {
                debug!(error = %e, "Rate unavailable");
                FetchOutcome::Absent(e)
            }
        }
    }

    /// Compare the latest rate with the previous day's rate.
    ///
    /// Returns `None` if either side is unavailable.
    pub async fn compare_with_previous_day(&self, pair: &CurrencyPair) -> Option<DailyChange> {
        self.compare_with_previous_day_from(pair, today()).await
    }

    /// Like [`Self::compare_with_previous_day`] with an explicit "today".
    pub async fn compare_with_previous_day_from(
        &self,
        pair: &CurrencyPair,
        anchor: NaiveDate,
    ) -> Option<DailyChange> {
        let current = self.fetch_rate(pair, RateDate::Latest).await.into_point();
        let previous = self
            .fetch_rate(pair, RateDate::On(previous_day(anchor)))
            .await
            .into_point();

        match (previous, current) {
            (Some(previous), Some(current)) => DailyChange::between(previous, current)
                .map_err(|e| debug!(pair = %pair, error = %e, "Skipping day-over-day comparison"))
                .ok(),
            _ => {
                debug!(pair = %pair, "Skipping day-over-day comparison");
                None
            }
        }
    }

    async fn try_fetch(&self, pair: &CurrencyPair, date: RateDate) -> FxResult<RatePoint> {
        let response = self.fetch_document(&pair.base, date).await?;
        parse_rate(&response.body, pair, date)
    }

    async fn fetch_document(&self, base: &Currency, date: RateDate) -> FxResult<HttpResponse> {
        let primary_url = self.endpoints.primary_url(base, date);
        match self.transport.get(&primary_url).await {
            Ok(response) if response.is_success() => return Ok(response),
            Ok(response) => {
                debug!(url = %primary_url, status = response.status, "Primary endpoint failed, trying fallback");
            }
            Err(e) => {
                debug!(url = %primary_url, error = %e, "Primary endpoint unreachable, trying fallback");
            }
        }

        let fallback_url = self.endpoints.fallback_url(base, date);
        let response = self.transport.get(&fallback_url).await?;
        if !response.is_success() {
            return Err(FxError::Status {
                url: fallback_url,
                status: response.status,
            });
        }
        Ok(response)
    }
}

/// Extract `body[base][quote]` from a rate document.
///
/// For [`RateDate::Latest`] the point is dated by the document's own
/// `date` field, or today when that is missing.
pub fn parse_rate(body: &str, pair: &CurrencyPair, date: RateDate) -> FxResult<RatePoint> {
    let document: Value =
        serde_json::from_str(body).map_err(|e| FxError::MalformedPayload(e.to_string()))?;

    let missing = || FxError::MissingRate {
        pair: pair.clone(),
        date,
    };

    let raw = document
        .get(pair.base.api_code())
        .and_then(|table| table.get(pair.quote.api_code()))
        .ok_or_else(missing)?;

    let rate = match raw {
        Value::Number(number) => decimal_from_number(number),
        _ => None,
    }
    .ok_or_else(|| FxError::MalformedPayload(format!("rate for {} is not a number: {}", pair, raw)))?;

    let day = match date {
        RateDate::On(day) => day,
        RateDate::Latest => document
            .get("date")
            .and_then(Value::as_str)
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            .unwrap_or_else(today),
    };

    Ok(RatePoint::new(day, rate)?)
}

fn decimal_from_number(number: &Number) -> Option<Decimal> {
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}
