//! NBU exchange-rate provider
//!
//! Fetches official daily UAH rates from the National Bank of Ukraine
//! statdirectory endpoint. Only USD and EUR are supported; anything else is
//! rejected before a request is built.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::StatementError;

const DEFAULT_BASE_URL: &str = "https://bank.gov.ua";
const SUPPORTED_CURRENCIES: [&str; 2] = ["USD", "EUR"];
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One entry of the statdirectory exchange response
#[derive(Debug, Deserialize)]
struct NbuRate {
    rate: f64,
}

/// Async exchange-rate lookup the resolver dispatches against.
///
/// The cache owns memoization; implementations only fetch.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_rate(&self, currency: &str, date: NaiveDate) -> Result<Decimal>;
}

/// HTTP client for the NBU statdirectory API
pub struct NbuProvider {
    client: Client,
    base_url: String,
}

impl NbuProvider {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; ZvitBot/1.0)")
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the provider at a different host (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl RateProvider for NbuProvider {
    async fn fetch_rate(&self, currency: &str, date: NaiveDate) -> Result<Decimal> {
        if !SUPPORTED_CURRENCIES.contains(&currency) {
            return Err(StatementError::UnsupportedCurrency(currency.to_string()).into());
        }

        let url = format!(
            "{}/NBUStatService/v1/statdirectory/exchange?valcode={}&date={}&json",
            self.base_url,
            currency.to_lowercase(),
            date.format("%Y%m%d"),
        );
        info!("Fetching NBU rate for {} on {}", currency, date);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send request to NBU")?;

        if !response.status().is_success() {
            return Err(anyhow!("NBU returned error status: {}", response.status()));
        }

        let entries: Vec<NbuRate> = response
            .json()
            .await
            .context("Failed to parse NBU response")?;

        let rate = entries
            .first()
            .ok_or_else(|| anyhow!("NBU returned no rate for {} on {}", currency, date))?
            .rate;

        let rate = Decimal::from_f64_retain(rate).ok_or_else(|| anyhow!("Invalid rate value"))?;
        debug!("NBU rate for {} on {}: {}", currency, date, rate);
        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unsupported_currency_fails_without_network() {
        // Unroutable base URL: a network attempt would error differently
        let provider = NbuProvider::new().unwrap().with_base_url("http://[::1]:1");
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

        let err = provider.fetch_rate("GBP", date).await.unwrap_err();
        assert_eq!(err.to_string(), "unsupported currency: GBP");
    }

    #[test]
    fn test_response_entry_deserializes() {
        let body = r#"[{"r030":840,"txt":"Долар США","rate":27.5,"cc":"USD","exchangedate":"02.01.2024"}]"#;
        let entries: Vec<NbuRate> = serde_json::from_str(body).unwrap();
        assert_eq!(entries[0].rate, 27.5);
    }
}
