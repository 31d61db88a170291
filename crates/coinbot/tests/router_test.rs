//! Drives the public router and bot loop through in-memory sources

use async_trait::async_trait;
use chrono::NaiveDate;
use coinbot::api::{
    ExchangeRate, ExchangeRateSource, NewsItem, NewsSource, PricePoint, PriceQuote, PriceSource,
    SeriesSource,
};
use coinbot::lookups::{ChartRenderer, CurrencyConvert, HistoryChart, NewsLookup, PriceLookup};
use coinbot::{BotError, ChartConfig, ChatTransport, CoinBot, InboundMessage, MessageRouter, Reply};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

struct FixedPrice {
    rate_text: &'static str,
    calls: AtomicUsize,
}

#[async_trait]
impl PriceSource for FixedPrice {
    async fn current_price(&self) -> coinbot::Result<PriceQuote> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(PriceQuote {
            base: "BTC".to_string(),
            quote: "USD".to_string(),
            rate: self.rate_text.replace(',', "").parse().unwrap(),
            rate_text: self.rate_text.to_string(),
        })
    }
}

struct FixedNews(usize);

#[async_trait]
impl NewsSource for FixedNews {
    async fn latest_news(&self, limit: usize) -> coinbot::Result<Vec<NewsItem>> {
        Ok((0..self.0.min(limit))
            .map(|i| NewsItem {
                title: format!("Bitcoin headline {i}"),
                link: format!("https://news.example.com/{i}"),
                published_at: "Tue, 02 Jan 2024 08:00:00 GMT".to_string(),
            })
            .collect())
    }
}

struct BrokenSeries;

#[async_trait]
impl SeriesSource for BrokenSeries {
    async fn daily_closes(&self) -> coinbot::Result<Vec<PricePoint>> {
        Err(BotError::DataFormat(
            "Missing \"4a. close (USD)\" for 2024-01-02".to_string(),
        ))
    }
}

struct FixedSeries;

#[async_trait]
impl SeriesSource for FixedSeries {
    async fn daily_closes(&self) -> coinbot::Result<Vec<PricePoint>> {
        Ok((1..=3)
            .map(|day| PricePoint {
                date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                close_usd: Decimal::from(40_000 + day * 500),
            })
            .collect())
    }
}

struct RateTable {
    rates: HashMap<&'static str, Decimal>,
    calls: AtomicUsize,
}

#[async_trait]
impl ExchangeRateSource for RateTable {
    async fn exchange_rate(&self, from: &str, to: &str) -> coinbot::Result<Option<ExchangeRate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.rates.get(to).map(|rate| ExchangeRate {
            from: from.to_string(),
            to: to.to_string(),
            rate: *rate,
        }))
    }
}

struct Fixture {
    price: Arc<FixedPrice>,
    rates: Arc<RateTable>,
    router: MessageRouter,
}

fn fixture(series: Arc<dyn SeriesSource>) -> Fixture {
    let price = Arc::new(FixedPrice {
        rate_text: "67890.12",
        calls: AtomicUsize::new(0),
    });
    let rates = Arc::new(RateTable {
        rates: HashMap::from([("EUR", dec!(0.92)), ("RUB", dec!(90.5))]),
        calls: AtomicUsize::new(0),
    });
    let mut chart = ChartConfig::default();
    if let Ok(path) = std::env::var("COINBOT_CHART_FONT") {
        chart.font_path = PathBuf::from(path);
    }

    let router = MessageRouter::new(
        PriceLookup::new(price.clone()),
        NewsLookup::new(Arc::new(FixedNews(8)), 5),
        HistoryChart::new(series, ChartRenderer::new(chart)),
        CurrencyConvert::new(price.clone(), rates.clone()),
    );

    Fixture {
        price,
        rates,
        router,
    }
}

fn text(reply: &Reply) -> &str {
    match reply {
        Reply::Text(t) => t,
        Reply::Image(_) => panic!("expected a text reply"),
    }
}

#[tokio::test]
async fn price_reply_contains_rate() {
    let f = fixture(Arc::new(BrokenSeries));
    let replies = f.router.handle("  ЦЕНА ").await;
    assert_eq!(replies.len(), 1);
    assert!(text(&replies[0]).contains("67890.12 USD"));
}

#[tokio::test]
async fn news_capped_at_five_in_order() {
    let f = fixture(Arc::new(BrokenSeries));
    let replies = f.router.handle("Новости").await;
    assert_eq!(replies.len(), 5);
    for (i, reply) in replies.iter().enumerate() {
        assert!(text(reply).starts_with(&format!("Bitcoin headline {i}\n")));
    }
}

#[tokio::test]
async fn convert_to_euro() {
    let f = fixture(Arc::new(BrokenSeries));
    let replies = f.router.handle("convert 2 EUR").await;
    assert_eq!(text(&replies[0]), "2.0 BTC = 124917.82 EUR");
}

#[tokio::test]
async fn convert_alias_and_lowercase_code() {
    let f = fixture(Arc::new(BrokenSeries));
    let replies = f.router.handle("перевести 0.01 rub").await;
    // 0.01 * 67890.12 * 90.5 = 61440.5586
    assert_eq!(text(&replies[0]), "0.01 BTC = 61440.56 RUB");
}

#[tokio::test]
async fn convert_unknown_currency() {
    let f = fixture(Arc::new(BrokenSeries));
    let replies = f.router.handle("convert 1 XYZ").await;
    assert_eq!(replies.len(), 1);
    assert!(text(&replies[0]).contains("USD и XYZ"));
}

#[tokio::test]
async fn convert_usage_error_makes_no_calls() {
    let f = fixture(Arc::new(BrokenSeries));
    let replies = f.router.handle("convert 5").await;
    assert_eq!(replies.len(), 1);
    assert_eq!(f.price.calls.load(Ordering::SeqCst), 0);
    assert_eq!(f.rates.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn chart_with_missing_close_sends_notice_only() {
    let f = fixture(Arc::new(BrokenSeries));
    let replies = f.router.handle("график").await;
    assert_eq!(replies.len(), 1);
    assert!(matches!(replies[0], Reply::Text(_)));
}

#[tokio::test]
async fn chart_renders_png() {
    let font = std::env::var("COINBOT_CHART_FONT")
        .map_or_else(|_| ChartConfig::default().font_path, PathBuf::from);
    if !font.is_file() {
        eprintln!("skipping: no chart font at {}", font.display());
        return;
    }

    let f = fixture(Arc::new(FixedSeries));
    let replies = f.router.handle("график").await;
    match &replies[..] {
        [Reply::Image(png)] => assert!(png.starts_with(b"\x89PNG\r\n\x1a\n")),
        other => panic!("expected one image, got {other:?}"),
    }
}

#[test]
fn startup_rejects_missing_chart_font() {
    let config = coinbot::BotConfig::builder()
        .alpha_vantage_api_key("demo")
        .chart_font("/nonexistent/font.ttf")
        .build()
        .unwrap();
    let err = MessageRouter::from_config(&config).err().unwrap();
    assert!(matches!(err, BotError::Config(_)));
    assert!(err.to_string().contains("COINBOT_CHART_FONT"));
}

#[test]
fn greeting_for_start() {
    let f = fixture(Arc::new(BrokenSeries));
    let replies = tokio_test::block_on(f.router.handle("/start"));
    assert!(text(&replies[0]).contains("новости"));
}

/// Scripted transport recording everything sent
struct ScriptedTransport {
    inbound: Vec<Vec<InboundMessage>>,
    sent: Arc<Mutex<Vec<(i64, String)>>>,
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn poll(&mut self) -> coinbot::Result<Option<Vec<InboundMessage>>> {
        if self.inbound.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.inbound.remove(0)))
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> coinbot::Result<()> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }

    async fn send_image(&self, chat_id: i64, _png: Vec<u8>) -> coinbot::Result<()> {
        self.sent.lock().unwrap().push((chat_id, "<image>".to_string()));
        Ok(())
    }
}

#[tokio::test]
async fn bot_answers_in_message_order() {
    let f = fixture(Arc::new(BrokenSeries));
    let sent = Arc::new(Mutex::new(Vec::new()));
    let transport = ScriptedTransport {
        inbound: vec![
            vec![
                InboundMessage {
                    chat_id: 1,
                    text: "цена".to_string(),
                },
                InboundMessage {
                    chat_id: 2,
                    text: "convert 2 eur".to_string(),
                },
            ],
            vec![],
            vec![InboundMessage {
                chat_id: 1,
                text: "convert 5".to_string(),
            }],
        ],
        sent: sent.clone(),
    };

    CoinBot::new(f.router, transport).run().await;

    let sent = sent.lock().unwrap();
    let chats: Vec<i64> = sent.iter().map(|(chat, _)| *chat).collect();
    assert_eq!(chats, vec![1, 2, 1]);
    assert_eq!(sent[1].1, "2.0 BTC = 124917.82 EUR");
    assert!(sent[2].1.contains("convert <количество>"));
}
