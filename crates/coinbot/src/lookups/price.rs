//! Current price lookup

use crate::api::{PriceQuote, PriceSource};
use crate::error::Result;
use std::sync::Arc;

/// Fetches the current BTC/USD quote
#[derive(Clone)]
pub struct PriceLookup {
    source: Arc<dyn PriceSource>,
}

impl PriceLookup {
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self { source }
    }

    pub async fn run(&self) -> Result<PriceQuote> {
        let quote = self.source.current_price().await?;
        tracing::debug!(rate = %quote.rate, "Fetched BTC price");
        Ok(quote)
    }

    /// Reply text, showing the rate as the service sent it
    pub fn format(quote: &PriceQuote) -> String {
        format!("Текущая цена биткоина: {} {}", quote.rate_text, quote.quote)
    }
}
