//! News digest lookup

use crate::api::{NewsItem, NewsSource};
use crate::config::MAX_NEWS_ITEMS;
use crate::error::Result;
use std::sync::Arc;

/// Fetches the head of the news feed
#[derive(Clone)]
pub struct NewsLookup {
    source: Arc<dyn NewsSource>,
    limit: usize,
}

impl NewsLookup {
    /// `limit` is clamped to at most five items
    pub fn new(source: Arc<dyn NewsSource>, limit: usize) -> Self {
        Self {
            source,
            limit: limit.min(MAX_NEWS_ITEMS),
        }
    }

    pub async fn run(&self) -> Result<Vec<NewsItem>> {
        let mut items = self.source.latest_news(self.limit).await?;
        items.truncate(self.limit);
        tracing::debug!(items = items.len(), "Fetched news");
        Ok(items)
    }

    /// One chat message per item
    pub fn format(item: &NewsItem) -> String {
        format!("{}\n{}\n{}", item.title, item.link, item.published_at)
    }
}
