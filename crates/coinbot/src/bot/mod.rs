//! Bitcoin chat bot
//!
//! [`CoinBot`] pulls inbound messages from a [`ChatTransport`], runs each
//! through the [`MessageRouter`] and sends the replies back in order.
//! Messages are handled one at a time; the next message is not looked at
//! until every reply to the current one has been sent.
//!
//! # Example
//!
//! ```rust,ignore
//! use coinbot::bot::{CoinBot, MessageRouter};
//! use coinbot::platforms::ConsoleTransport;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = coinbot::BotConfig::from_env()?;
//!     let router = MessageRouter::from_config(&config)?;
//!     let mut bot = CoinBot::new(router, ConsoleTransport::new("images"));
//!     bot.run().await;
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod router;

use crate::platforms::{ChatTransport, InboundMessage};
use std::time::Duration;

pub use commands::{Command, GREETING};
pub use router::MessageRouter;

/// One outbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    /// PNG bytes
    Image(Vec<u8>),
}

/// Poll/dispatch loop over a transport
pub struct CoinBot<T> {
    router: MessageRouter,
    transport: T,
    retry_delay: Duration,
}

impl<T: ChatTransport> CoinBot<T> {
    pub fn new(router: MessageRouter, transport: T) -> Self {
        Self {
            router,
            transport,
            retry_delay: Duration::from_secs(5),
        }
    }

    /// Wait time after a failed poll
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Run until the transport reports end of input
    pub async fn run(&mut self) {
        tracing::info!("Bot started");

        loop {
            match self.transport.poll().await {
                Ok(Some(messages)) => {
                    for message in messages {
                        self.handle_message(&message).await;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Polling failed, retrying");
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }

        tracing::info!("Transport closed, stopping");
    }

    /// Answer one message; send failures are logged and skipped
    pub async fn handle_message(&self, message: &InboundMessage) {
        let chat_id = message.chat_id;
        tracing::debug!(chat_id, text = %message.text, "Received message");

        for reply in self.router.handle(&message.text).await {
            let sent = match reply {
                Reply::Text(text) => self.transport.send_text(chat_id, &text).await,
                Reply::Image(png) => self.transport.send_image(chat_id, png).await,
            };

            if let Err(e) = sent {
                tracing::warn!(chat_id, error = %e, "Failed to send reply");
            }
        }
    }
}
