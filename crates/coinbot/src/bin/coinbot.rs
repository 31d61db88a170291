//! Bitcoin chat bot
//!
//! # Usage
//!
//! ```bash
//! # Required
//! export ALPHA_VANTAGE_API_KEY="your-key"
//! export TELEGRAM_BOT_TOKEN="123456:ABC..."
//!
//! # Run against Telegram
//! cargo run --bin coinbot
//!
//! # Or type messages locally; charts land in ./charts
//! cargo run --bin coinbot -- --console --images-dir charts
//! ```

use anyhow::Context;
use clap::Parser;
use coinbot::{
    BotConfig, ChatTransport, CoinBot, ConsoleTransport, MessageRouter, TelegramConfig,
    TelegramTransport,
};
use coinbot_utils::{DEFAULT_FILTER, LogFormat, init_tracing};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "coinbot", version, about = "Bitcoin price, chart, news and conversion bot")]
struct Args {
    /// Read messages from stdin instead of Telegram
    #[arg(long)]
    console: bool,

    /// Directory for chart images in console mode
    #[arg(long, default_value = "charts")]
    images_dir: PathBuf,

    /// Log output format (pretty or json)
    #[arg(long, default_value = "pretty")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    init_tracing(args.log_format, DEFAULT_FILTER)?;

    let config = BotConfig::from_env().context("Invalid configuration")?;
    let router = MessageRouter::from_config(&config).context("Failed to set up data sources")?;

    if args.console {
        tracing::info!(images_dir = %args.images_dir.display(), "Starting console transport");
        println!("{}\n", coinbot::bot::GREETING);
        run(CoinBot::new(router, ConsoleTransport::new(args.images_dir))).await;
    } else {
        let telegram = TelegramConfig::from_env().context("Invalid Telegram configuration")?;
        tracing::info!(api_url = %telegram.api_url, "Starting Telegram transport");
        run(CoinBot::new(router, TelegramTransport::new(telegram)?)).await;
    }

    Ok(())
}

async fn run<T: ChatTransport>(mut bot: CoinBot<T>) {
    tokio::select! {
        () = bot.run() => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::warn!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutting down");
        }
    }
}
