//! Request-scoped market data values

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Current BTC price in a quote currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Base asset (always "BTC")
    pub base: String,
    /// Quote currency (always "USD")
    pub quote: String,
    /// Parsed rate
    pub rate: Decimal,
    /// Rate exactly as the service returned it
    pub rate_text: String,
}

/// One entry from the news feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    /// Publication date text, not parsed
    pub published_at: String,
}

/// Daily closing price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close_usd: Decimal,
}

/// Multiplier converting one unit of `from` into `to`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub from: String,
    pub to: String,
    pub rate: Decimal,
}
