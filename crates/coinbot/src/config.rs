//! Configuration for the bot's data sources and chart output

use crate::error::{BotError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Current BTC price in USD
pub const DEFAULT_PRICE_URL: &str = "https://api.coindesk.com/v1/bpi/currentprice/BTC.json";
/// Google News RSS search
pub const DEFAULT_NEWS_URL: &str = "https://news.google.com/rss/search";
/// Alpha Vantage query endpoint
pub const DEFAULT_ALPHA_VANTAGE_URL: &str = "https://www.alphavantage.co/query";
/// Upper bound on news items per request
pub const MAX_NEWS_ITEMS: usize = 5;

/// Font files tried in order when no chart font is configured
pub const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/local/share/fonts/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// First candidate font present on this host, or the first candidate
pub fn default_font_path() -> PathBuf {
    FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
        .unwrap_or_else(|| PathBuf::from(FONT_CANDIDATES[0]))
}

/// Chart rendering settings
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// TrueType font used for the title and axis labels
    ///
    /// Fonts are registered with plotters once per process. A renderer with a
    /// different path still draws with the first registered font and logs a
    /// warning; the path must exist either way.
    pub font_path: PathBuf,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 500,
            font_path: default_font_path(),
        }
    }
}

/// Configuration shared by the data source clients
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Alpha Vantage API key (series and exchange rates)
    pub alpha_vantage_api_key: String,

    /// Price endpoint returning `bpi.USD.rate`
    pub price_url: String,

    /// RSS search endpoint
    pub news_url: String,

    /// Search term sent to the news feed
    pub news_query: String,

    /// Items taken from the head of the feed
    pub news_limit: usize,

    /// Alpha Vantage base URL
    pub alpha_vantage_url: String,

    /// Timeout applied to every outbound HTTP request
    pub request_timeout: Duration,

    /// Chart settings
    pub chart: ChartConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            alpha_vantage_api_key: String::new(),
            price_url: DEFAULT_PRICE_URL.to_string(),
            news_url: DEFAULT_NEWS_URL.to_string(),
            news_query: "Bitcoin".to_string(),
            news_limit: MAX_NEWS_ITEMS,
            alpha_vantage_url: DEFAULT_ALPHA_VANTAGE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            chart: ChartConfig::default(),
        }
    }
}

impl BotConfig {
    /// Create a new configuration builder
    pub fn builder() -> BotConfigBuilder {
        BotConfigBuilder::default()
    }

    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| lookup(*k).filter(|v| !v.trim().is_empty()))
        };

        let api_key = get(&["ALPHA_VANTAGE_API_KEY", "API_KEY"]).ok_or_else(|| {
            BotError::Config("ALPHA_VANTAGE_API_KEY environment variable not set".to_string())
        })?;

        let mut builder = BotConfig::builder().alpha_vantage_api_key(api_key);

        if let Some(url) = get(&["COINBOT_PRICE_URL"]) {
            builder = builder.price_url(url);
        }
        if let Some(url) = get(&["COINBOT_NEWS_URL"]) {
            builder = builder.news_url(url);
        }
        if let Some(query) = get(&["COINBOT_NEWS_QUERY"]) {
            builder = builder.news_query(query);
        }
        if let Some(url) = get(&["COINBOT_ALPHA_VANTAGE_URL"]) {
            builder = builder.alpha_vantage_url(url);
        }
        if let Some(secs) = get(&["COINBOT_REQUEST_TIMEOUT_SECS"]) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                BotError::Config(format!("COINBOT_REQUEST_TIMEOUT_SECS is not a number: {secs}"))
            })?;
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        if let Some(path) = get(&["COINBOT_CHART_FONT"]) {
            builder = builder.chart_font(path);
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.alpha_vantage_api_key.trim().is_empty() {
            return Err(BotError::Config(
                "Alpha Vantage API key is required".to_string(),
            ));
        }

        if self.news_limit == 0 || self.news_limit > MAX_NEWS_ITEMS {
            return Err(BotError::Config(format!(
                "news_limit must be between 1 and {MAX_NEWS_ITEMS}"
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(BotError::Config(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(BotError::Config("chart size must be non-zero".to_string()));
        }

        Ok(())
    }

    /// Build the shared HTTP client with the configured timeout
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .user_agent(concat!("coinbot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BotError::Config(format!("Failed to create HTTP client: {e}")))
    }
}

/// Builder for BotConfig
#[derive(Debug, Default)]
pub struct BotConfigBuilder {
    alpha_vantage_api_key: Option<String>,
    price_url: Option<String>,
    news_url: Option<String>,
    news_query: Option<String>,
    news_limit: Option<usize>,
    alpha_vantage_url: Option<String>,
    request_timeout: Option<Duration>,
    chart_size: Option<(u32, u32)>,
    chart_font: Option<PathBuf>,
}

impl BotConfigBuilder {
    /// Set Alpha Vantage API key
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Set the price endpoint
    pub fn price_url(mut self, url: impl Into<String>) -> Self {
        self.price_url = Some(url.into());
        self
    }

    /// Set the RSS endpoint
    pub fn news_url(mut self, url: impl Into<String>) -> Self {
        self.news_url = Some(url.into());
        self
    }

    /// Set the news search term
    pub fn news_query(mut self, query: impl Into<String>) -> Self {
        self.news_query = Some(query.into());
        self
    }

    /// Set how many feed items are returned
    pub fn news_limit(mut self, limit: usize) -> Self {
        self.news_limit = Some(limit);
        self
    }

    /// Set the Alpha Vantage base URL
    pub fn alpha_vantage_url(mut self, url: impl Into<String>) -> Self {
        self.alpha_vantage_url = Some(url.into());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set chart dimensions in pixels
    pub fn chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart_size = Some((width, height));
        self
    }

    /// Set the chart font file
    pub fn chart_font(mut self, path: impl Into<PathBuf>) -> Self {
        self.chart_font = Some(path.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<BotConfig> {
        let defaults = BotConfig::default();
        let (width, height) = self
            .chart_size
            .unwrap_or((defaults.chart.width, defaults.chart.height));

        let config = BotConfig {
            alpha_vantage_api_key: self.alpha_vantage_api_key.unwrap_or_default(),
            price_url: self.price_url.unwrap_or(defaults.price_url),
            news_url: self.news_url.unwrap_or(defaults.news_url),
            news_query: self.news_query.unwrap_or(defaults.news_query),
            news_limit: self.news_limit.unwrap_or(defaults.news_limit),
            alpha_vantage_url: self.alpha_vantage_url.unwrap_or(defaults.alpha_vantage_url),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            chart: ChartConfig {
                width,
                height,
                font_path: self.chart_font.unwrap_or(defaults.chart.font_path),
            },
        };

        config.validate()?;
        Ok(config)
    }
}
