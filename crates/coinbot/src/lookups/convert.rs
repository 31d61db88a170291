//! BTC to fiat conversion
//!
//! Composes the current BTC/USD price with a USD->target exchange rate. All
//! arithmetic is exact decimal multiplication; rounding happens only when the
//! reply text is produced.

use crate::api::{ExchangeRateSource, PriceSource};
use crate::error::{BotError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use std::sync::Arc;

const USD: &str = "USD";

/// Validated arguments of a convert command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertRequest {
    pub amount: Decimal,
    /// Uppercased currency code
    pub target: String,
}

impl ConvertRequest {
    /// Parse `amount` and `code` as typed by the user
    pub fn parse(amount: &str, code: &str) -> Result<Self> {
        let amount_text = amount.trim();
        let amount = Decimal::from_str(amount_text)
            .or_else(|_| Decimal::from_scientific(amount_text))
            .map_err(|_| BotError::Format(format!("Некорректное количество: {amount_text}")))?;

        if amount <= Decimal::ZERO {
            return Err(BotError::Format(format!(
                "Количество должно быть больше нуля: {amount_text}"
            )));
        }

        let target = code.trim().to_uppercase();
        if target.is_empty() {
            return Err(BotError::Format("Не указан код валюты".to_string()));
        }

        Ok(Self { amount, target })
    }
}

/// Result of a conversion with its inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub amount_btc: Decimal,
    pub btc_usd: Decimal,
    pub usd_to_target: Decimal,
    pub target: String,
    /// `amount_btc * btc_usd * usd_to_target`, unrounded
    pub converted: Decimal,
}

impl Conversion {
    pub fn compute(
        amount_btc: Decimal,
        btc_usd: Decimal,
        usd_to_target: Decimal,
        target: impl Into<String>,
    ) -> Result<Self> {
        let converted = amount_btc
            .checked_mul(btc_usd)
            .and_then(|usd| usd.checked_mul(usd_to_target))
            .ok_or_else(|| BotError::Format(format!("Слишком большое количество: {amount_btc}")))?;

        Ok(Self {
            amount_btc,
            btc_usd,
            usd_to_target,
            target: target.into(),
            converted,
        })
    }

    /// `"{amount} BTC = {converted} {CODE}"`
    pub fn reply_text(&self) -> String {
        let amount = self.amount_btc.normalize();
        let amount = if amount.scale() == 0 {
            format!("{amount}.0")
        } else {
            amount.to_string()
        };

        let converted = self
            .converted
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        format!("{amount} BTC = {converted:.2} {}", self.target)
    }
}

/// Converts a BTC amount into another currency via USD
#[derive(Clone)]
pub struct CurrencyConvert {
    price: Arc<dyn PriceSource>,
    rates: Arc<dyn ExchangeRateSource>,
}

impl CurrencyConvert {
    pub fn new(price: Arc<dyn PriceSource>, rates: Arc<dyn ExchangeRateSource>) -> Self {
        Self { price, rates }
    }

    pub async fn run(&self, request: &ConvertRequest) -> Result<Conversion> {
        let quote = self.price.current_price().await?;

        let rate = self
            .rates
            .exchange_rate(USD, &request.target)
            .await?
            .ok_or_else(|| BotError::ConversionUnavailable {
                from: USD.to_string(),
                to: request.target.clone(),
            })?;

        let conversion =
            Conversion::compute(request.amount, quote.rate, rate.rate, &request.target)?;

        tracing::debug!(
            amount = %conversion.amount_btc,
            target = %conversion.target,
            converted = %conversion.converted,
            "Converted"
        );
        Ok(conversion)
    }
}
