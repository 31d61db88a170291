//! Inbound text to replies
//!
//! The router is the only place errors are turned into user-facing text:
//! every failure becomes exactly one notice and nothing is retried.

use super::Reply;
use super::commands::{Command, GREETING};
use crate::api::{AlphaVantageClient, CoindeskClient, GoogleNewsClient};
use crate::config::BotConfig;
use crate::error::Result;
use crate::lookups::{
    ChartRenderer, CurrencyConvert, HistoryChart, NewsLookup, PriceLookup,
};
use std::sync::Arc;

/// Dispatches parsed commands to the lookups
#[derive(Clone)]
pub struct MessageRouter {
    price: PriceLookup,
    news: NewsLookup,
    chart: HistoryChart,
    convert: CurrencyConvert,
}

impl MessageRouter {
    pub fn new(
        price: PriceLookup,
        news: NewsLookup,
        chart: HistoryChart,
        convert: CurrencyConvert,
    ) -> Self {
        Self {
            price,
            news,
            chart,
            convert,
        }
    }

    /// Wire the default HTTP clients from configuration
    ///
    /// The chart font is loaded here, so a missing font fails startup.
    pub fn from_config(config: &BotConfig) -> Result<Self> {
        let renderer = ChartRenderer::new(config.chart.clone());
        renderer.preload()?;

        let client = config.http_client()?;
        let coindesk = Arc::new(CoindeskClient::from_config(config, client.clone()));
        let google_news = Arc::new(GoogleNewsClient::from_config(config, client.clone()));
        let alpha_vantage = Arc::new(AlphaVantageClient::from_config(config, client));

        Ok(Self::new(
            PriceLookup::new(coindesk.clone()),
            NewsLookup::new(google_news, config.news_limit),
            HistoryChart::new(alpha_vantage.clone(), renderer),
            CurrencyConvert::new(coindesk, alpha_vantage),
        ))
    }

    /// Replies for one inbound message, in send order
    pub async fn handle(&self, text: &str) -> Vec<Reply> {
        let command = match Command::parse(text) {
            Ok(command) => command,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected command");
                return vec![Reply::Text(e.user_notice())];
            }
        };

        let name = command.name();
        match self.execute(command).await {
            Ok(replies) => {
                tracing::info!(command = name, replies = replies.len(), "Handled command");
                replies
            }
            Err(e) => {
                tracing::warn!(command = name, error = %e, "Command failed");
                vec![Reply::Text(e.user_notice())]
            }
        }
    }

    async fn execute(&self, command: Command) -> Result<Vec<Reply>> {
        match command {
            Command::Price => {
                let quote = self.price.run().await?;
                Ok(vec![Reply::Text(PriceLookup::format(&quote))])
            }
            Command::News => {
                let items = self.news.run().await?;
                Ok(items
                    .iter()
                    .map(|item| Reply::Text(NewsLookup::format(item)))
                    .collect())
            }
            Command::Chart => Ok(vec![Reply::Image(self.chart.run().await?)]),
            Command::Convert(request) => {
                let conversion = self.convert.run(&request).await?;
                Ok(vec![Reply::Text(conversion.reply_text())])
            }
            Command::Greeting => Ok(vec![Reply::Text(GREETING.to_string())]),
        }
    }
}
