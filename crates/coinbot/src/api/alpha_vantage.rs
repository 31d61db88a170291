//! Alpha Vantage API client

use super::{
    ExchangeRate, ExchangeRateSource, PricePoint, SeriesSource, decimal_from_value,
    ensure_success,
};
use crate::config::BotConfig;
use crate::error::{BotError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::Value;

const PROVIDER: &str = "Alpha Vantage";

const SERIES_KEY: &str = "Time Series (Digital Currency Daily)";
const CLOSE_KEY: &str = "4a. close (USD)";
/// Field name used by the current revision of DIGITAL_CURRENCY_DAILY
const CLOSE_KEY_CURRENT: &str = "4. close";

const RATE_OBJECT_KEY: &str = "Realtime Currency Exchange Rate";
const RATE_KEY: &str = "5. Exchange Rate";

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Create a client from the configuration on a shared HTTP client
    pub fn from_config(config: &BotConfig, client: Client) -> Self {
        Self::new(
            client,
            config.alpha_vantage_url.clone(),
            config.alpha_vantage_api_key.clone(),
        )
    }

    async fn query(&self, params: &[(&str, &str)]) -> Result<Value> {
        let function = params
            .iter()
            .find(|(k, _)| *k == "function")
            .map_or("", |(_, v)| *v);
        tracing::debug!(url = %self.base_url, function, "Querying Alpha Vantage");

        let response = self
            .client
            .get(&self.base_url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?;

        let response = ensure_success(response, PROVIDER).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl SeriesSource for AlphaVantageClient {
    async fn daily_closes(&self) -> Result<Vec<PricePoint>> {
        let data = self
            .query(&[
                ("function", "DIGITAL_CURRENCY_DAILY"),
                ("symbol", "BTC"),
                ("market", "USD"),
            ])
            .await?;

        let points = parse_daily_series(&data)?;
        tracing::debug!(points = points.len(), "Parsed daily series");
        Ok(points)
    }
}

#[async_trait]
impl ExchangeRateSource for AlphaVantageClient {
    async fn exchange_rate(&self, from: &str, to: &str) -> Result<Option<ExchangeRate>> {
        let data = self
            .query(&[
                ("function", "CURRENCY_EXCHANGE_RATE"),
                ("from_currency", from),
                ("to_currency", to),
            ])
            .await?;

        let rate = parse_exchange_rate(&data, from, to)?;
        if rate.is_none() {
            tracing::warn!(from, to, response = %data, "Exchange rate not found");
        }
        Ok(rate)
    }
}

/// Reject throttling and account notices, which arrive with a 200 status
///
/// `Note` is only sent for call frequency. `Information` also carries invalid
/// key and premium endpoint notices, which are not a rate limit.
fn check_throttle(data: &Value) -> Result<()> {
    if data.get("Note").is_some() {
        return Err(rate_limited());
    }
    if let Some(info) = data.get("Information") {
        let text = info.as_str().unwrap_or_default();
        if is_rate_limit_notice(text) {
            return Err(rate_limited());
        }
        return Err(BotError::RemoteService(format!("{PROVIDER}: {text}")));
    }
    Ok(())
}

fn is_rate_limit_notice(text: &str) -> bool {
    let text = text.to_lowercase();
    ["rate limit", "call frequency", "calls per", "requests per"]
        .iter()
        .any(|marker| text.contains(marker))
}

fn rate_limited() -> BotError {
    BotError::RateLimited {
        provider: PROVIDER.to_string(),
    }
}

/// Build an ascending series from the date-keyed object
fn parse_daily_series(data: &Value) -> Result<Vec<PricePoint>> {
    check_throttle(data)?;

    if let Some(error) = data.get("Error Message") {
        return Err(BotError::RemoteService(format!("{PROVIDER} error: {error}")));
    }

    let series = data
        .get(SERIES_KEY)
        .and_then(Value::as_object)
        .ok_or_else(|| BotError::DataFormat(format!("{PROVIDER} response missing \"{SERIES_KEY}\"")))?;

    let mut points = series
        .iter()
        .map(|(day, values)| {
            let date = NaiveDate::parse_from_str(day, "%Y-%m-%d")
                .map_err(|e| BotError::DataFormat(format!("Invalid series date {day}: {e}")))?;

            let raw = values
                .get(CLOSE_KEY)
                .or_else(|| values.get(CLOSE_KEY_CURRENT))
                .ok_or_else(|| {
                    BotError::DataFormat(format!("Missing \"{CLOSE_KEY}\" for {day}"))
                })?;

            let close_usd = decimal_from_value(raw)
                .filter(|c| *c > Decimal::ZERO)
                .ok_or_else(|| BotError::DataFormat(format!("Invalid close for {day}: {raw}")))?;

            Ok(PricePoint { date, close_usd })
        })
        .collect::<Result<Vec<_>>>()?;

    points.sort_by_key(|p| p.date);
    Ok(points)
}

/// Extract the realtime rate; a missing object is the provider's "not found"
fn parse_exchange_rate(data: &Value, from: &str, to: &str) -> Result<Option<ExchangeRate>> {
    check_throttle(data)?;

    let Some(raw) = data.get(RATE_OBJECT_KEY).and_then(|o| o.get(RATE_KEY)) else {
        return Ok(None);
    };

    let rate = decimal_from_value(raw)
        .filter(|r| *r > Decimal::ZERO)
        .ok_or_else(|| BotError::DataFormat(format!("Invalid exchange rate {from}->{to}: {raw}")))?;

    Ok(Some(ExchangeRate {
        from: from.to_string(),
        to: to.to_string(),
        rate,
    }))
}
