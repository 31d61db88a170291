//! API clients for market data providers
//!
//! Each client performs one GET per call and runs the body through an
//! explicit parse step, so a missing field surfaces as
//! [`BotError::DataFormat`] instead of a panic further down.

pub mod alpha_vantage;
pub mod coindesk;
pub mod google_news;
pub mod types;

pub use alpha_vantage::AlphaVantageClient;
pub use coindesk::CoindeskClient;
pub use google_news::GoogleNewsClient;
pub use types::{ExchangeRate, NewsItem, PricePoint, PriceQuote};

use crate::error::{BotError, Result};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Source of the current BTC/USD price
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn current_price(&self) -> Result<PriceQuote>;
}

/// Source of recent news items, newest first as published by the feed
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn latest_news(&self, limit: usize) -> Result<Vec<NewsItem>>;
}

/// Source of the daily BTC/USD close series
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// Daily closes sorted ascending by date
    async fn daily_closes(&self) -> Result<Vec<PricePoint>>;
}

/// Source of fiat exchange rates
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExchangeRateSource: Send + Sync {
    /// `Ok(None)` when the provider has no rate for the pair
    async fn exchange_rate(&self, from: &str, to: &str) -> Result<Option<ExchangeRate>>;
}

/// Turn a non-2xx response into an error carrying the status and body
pub(crate) async fn ensure_success(response: Response, provider: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(BotError::RateLimited {
            provider: provider.to_string(),
        });
    }

    let body = response.text().await.unwrap_or_default();
    Err(BotError::RemoteService(format!(
        "{provider} API error {status}: {body}"
    )))
}

/// Parse a decimal from text such as `"67,890.1234"`
pub(crate) fn parse_decimal(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

/// Parse a decimal from a JSON string or number without going through f64
pub(crate) fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => parse_decimal(s),
        Value::Number(n) => parse_decimal(&n.to_string()),
        _ => None,
    }
}
