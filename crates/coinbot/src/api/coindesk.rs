//! CoinDesk current price client

use super::{PriceQuote, PriceSource, decimal_from_value, ensure_success};
use crate::config::BotConfig;
use crate::error::{BotError, Result};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

const PROVIDER: &str = "CoinDesk";

/// Client for the CoinDesk Bitcoin Price Index endpoint
#[derive(Debug, Clone)]
pub struct CoindeskClient {
    client: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct CurrentPriceResponse {
    bpi: Bpi,
}

#[derive(Debug, Deserialize)]
struct Bpi {
    #[serde(rename = "USD")]
    usd: BpiEntry,
}

#[derive(Debug, Deserialize)]
struct BpiEntry {
    /// Either `"67,890.1234"` or a bare number depending on the API version
    rate: Value,
}

impl CoindeskClient {
    /// Create a client for the given endpoint
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Create a client from the configuration on a shared HTTP client
    pub fn from_config(config: &BotConfig, client: Client) -> Self {
        Self::new(client, config.price_url.clone())
    }
}

#[async_trait]
impl PriceSource for CoindeskClient {
    async fn current_price(&self) -> Result<PriceQuote> {
        tracing::debug!(url = %self.url, "Fetching current BTC price");

        let response = self.client.get(&self.url).send().await?;
        let response = ensure_success(response, PROVIDER).await?;
        let body: Value = response.json().await?;

        parse_current_price(body)
    }
}

/// Extract `bpi.USD.rate` into a quote
fn parse_current_price(body: Value) -> Result<PriceQuote> {
    let parsed: CurrentPriceResponse = serde_json::from_value(body)
        .map_err(|e| BotError::DataFormat(format!("{PROVIDER} response missing bpi.USD.rate: {e}")))?;

    let raw = parsed.bpi.usd.rate;
    let rate_text = match &raw {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };

    let rate = decimal_from_value(&raw).ok_or_else(|| {
        BotError::DataFormat(format!("{PROVIDER} rate is not a number: {rate_text}"))
    })?;

    if rate <= Decimal::ZERO {
        return Err(BotError::DataFormat(format!(
            "{PROVIDER} rate must be positive: {rate_text}"
        )));
    }

    Ok(PriceQuote {
        base: "BTC".to_string(),
        quote: "USD".to_string(),
        rate,
        rate_text,
    })
}
