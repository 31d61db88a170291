//! Bitcoin chat bot
//!
//! Answers a handful of chat keywords with live market data:
//!
//! - `цена`: current BTC/USD price
//! - `новости`: up to five latest Bitcoin headlines
//! - `график`: PNG chart of the daily close history
//! - `convert <amount> <code>`: BTC amount converted via USD into another currency
//!
//! Anything else gets a greeting listing the keywords.
//!
//! # Architecture
//!
//! - [`api`]: HTTP clients for CoinDesk, Google News RSS and Alpha Vantage,
//!   each behind a source trait
//! - [`lookups`]: the four operations built on those traits
//! - [`bot`]: command parsing, the [`MessageRouter`] and the [`CoinBot`] loop
//! - [`platforms`]: chat transports (Telegram, console)
//!
//! # Example
//!
//! ```rust,ignore
//! use coinbot::{BotConfig, MessageRouter};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = BotConfig::from_env()?;
//!     let router = MessageRouter::from_config(&config)?;
//!
//!     for reply in router.handle("цена").await {
//!         println!("{reply:?}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod bot;
pub mod config;
pub mod error;
pub mod lookups;
pub mod platforms;

pub use bot::{CoinBot, Command, MessageRouter, Reply};
pub use config::{BotConfig, ChartConfig};
pub use error::{BotError, Result};
pub use platforms::{ChatTransport, ConsoleTransport, InboundMessage, TelegramConfig, TelegramTransport};
