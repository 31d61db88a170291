//! Chat transports

pub mod console;
pub mod telegram;

pub use console::ConsoleTransport;
pub use telegram::{TelegramConfig, TelegramTransport};

use crate::error::Result;
use async_trait::async_trait;

/// A text message received from a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: i64,
    pub text: String,
}

/// Message source and sink for the bot loop
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatTransport: Send {
    /// Next batch of messages, possibly empty; `None` once input has ended
    async fn poll(&mut self) -> Result<Option<Vec<InboundMessage>>>;

    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;

    /// `png` is a complete PNG file
    async fn send_image(&self, chat_id: i64, png: Vec<u8>) -> Result<()>;
}
