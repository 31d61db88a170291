//! Google News RSS client

use super::{NewsItem, NewsSource, ensure_success};
use crate::config::{BotConfig, MAX_NEWS_ITEMS};
use crate::error::{BotError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const PROVIDER: &str = "Google News";

/// Client for the Google News RSS search feed
#[derive(Debug, Clone)]
pub struct GoogleNewsClient {
    client: Client,
    url: String,
    query: String,
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

impl GoogleNewsClient {
    /// Create a client searching `query` on the feed at `url`
    pub fn new(client: Client, url: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            query: query.into(),
        }
    }

    /// Create a client from the configuration on a shared HTTP client
    pub fn from_config(config: &BotConfig, client: Client) -> Self {
        Self::new(client, config.news_url.clone(), config.news_query.clone())
    }
}

#[async_trait]
impl NewsSource for GoogleNewsClient {
    async fn latest_news(&self, limit: usize) -> Result<Vec<NewsItem>> {
        tracing::debug!(url = %self.url, query = %self.query, "Fetching news feed");

        let response = self
            .client
            .get(&self.url)
            .query(&[("q", self.query.as_str())])
            .send()
            .await?;

        let response = ensure_success(response, PROVIDER).await?;
        let body = response.text().await?;

        parse_feed(&body, limit)
    }
}

/// Take the first `limit` items (at most five) in feed order
fn parse_feed(xml: &str, limit: usize) -> Result<Vec<NewsItem>> {
    let rss: Rss = quick_xml::de::from_str(xml)?;

    rss.channel
        .items
        .into_iter()
        .take(limit.min(MAX_NEWS_ITEMS))
        .enumerate()
        .map(|(index, item)| {
            let missing =
                |field: &str| BotError::DataFormat(format!("{PROVIDER} item {index} has no {field}"));
            Ok(NewsItem {
                title: item.title.ok_or_else(|| missing("title"))?,
                link: item.link.ok_or_else(|| missing("link"))?,
                published_at: item.pub_date.ok_or_else(|| missing("pubDate"))?,
            })
        })
        .collect()
}
