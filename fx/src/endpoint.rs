//! Rate source URL templates.

use ratewatch_common::{Currency, RateDate};
use serde::{Deserialize, Serialize};

/// Placeholder replaced by `latest` or `YYYY-MM-DD`.
pub const VERSION_PLACEHOLDER: &str = "{version}";
/// Placeholder replaced by the lowercase base currency code.
pub const BASE_PLACEHOLDER: &str = "{base}";

/// Default primary (CDN) template.
pub const DEFAULT_PRIMARY_TEMPLATE: &str =
    "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@{version}/v1/currencies/{base}.json";
/// Default fallback mirror template.
pub const DEFAULT_FALLBACK_TEMPLATE: &str =
    "https://{version}.currency-api.pages.dev/v1/currencies/{base}.json";

/// Primary and fallback endpoints serving identically structured documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEndpoints {
    /// Template queried first.
    pub primary: String,
    /// Template queried once when the primary fails.
    pub fallback: String,
}

impl Default for SourceEndpoints {
    fn default() -> Self {
        Self {
            primary: DEFAULT_PRIMARY_TEMPLATE.to_string(),
            fallback: DEFAULT_FALLBACK_TEMPLATE.to_string(),
        }
    }
}

impl SourceEndpoints {
    /// Create endpoints from two templates.
    pub fn new(primary: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            fallback: fallback.into(),
        }
    }

    /// URL of the primary document for `base` on `date`.
    pub fn primary_url(&self, base: &Currency, date: RateDate) -> String {
        render(&self.primary, base, date)
    }

    /// URL of the fallback document for `base` on `date`.
    pub fn fallback_url(&self, base: &Currency, date: RateDate) -> String {
        render(&self.fallback, base, date)
    }

    /// Check that both templates can address a per-currency document.
    pub fn validate(&self) -> Result<(), String> {
        for (name, template) in [("primary", &self.primary), ("fallback", &self.fallback)] {
            if template.trim().is_empty() {
                return Err(format!("{} endpoint cannot be empty", name));
            }
            if !template.contains(BASE_PLACEHOLDER) {
                return Err(format!(
                    "{} endpoint must contain {}",
                    name, BASE_PLACEHOLDER
                ));
            }
        }
        Ok(())
    }
}

fn render(template: &str, base: &Currency, date: RateDate) -> String {
    template
        .replace(VERSION_PLACEHOLDER, &date.version_segment())
        .replace(BASE_PLACEHOLDER, &base.api_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_default_latest_urls() {
        let endpoints = SourceEndpoints::default();
        let usd = Currency::usd();

        assert_eq!(
            endpoints.primary_url(&usd, RateDate::Latest),
            "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@latest/v1/currencies/usd.json"
        );
        assert_eq!(
            endpoints.fallback_url(&usd, RateDate::Latest),
            "https://latest.currency-api.pages.dev/v1/currencies/usd.json"
        );
    }

    #[test]
    fn test_dated_urls() {
        let endpoints = SourceEndpoints::default();
        let date = RateDate::On(NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());

        assert_eq!(
            endpoints.primary_url(&Currency::gbp(), date),
            "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@2024-03-06/v1/currencies/gbp.json"
        );
        assert_eq!(
            endpoints.fallback_url(&Currency::gbp(), date),
            "https://2024-03-06.currency-api.pages.dev/v1/currencies/gbp.json"
        );
    }

    #[test]
    fn test_validate() {
        assert!(SourceEndpoints::default().validate().is_ok());
        assert!(SourceEndpoints::new("", DEFAULT_FALLBACK_TEMPLATE).validate().is_err());
        assert!(SourceEndpoints::new(DEFAULT_PRIMARY_TEMPLATE, "https://mirror.test/usd.json")
            .validate()
            .is_err());
    }
}
