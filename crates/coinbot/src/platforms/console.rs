//! Local console transport
//!
//! Each stdin line is a message from chat 0. Text replies go to stdout and
//! images are written as numbered PNG files into a directory.

use super::{ChatTransport, InboundMessage};
use crate::error::{BotError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

pub const CONSOLE_CHAT_ID: i64 = 0;

/// Line-oriented transport for local use
pub struct ConsoleTransport<R = BufReader<Stdin>> {
    /// Locked only through `get_mut` in `poll`; keeps the transport `Sync`
    lines: Mutex<Lines<R>>,
    images_dir: PathBuf,
    images_written: AtomicUsize,
}

impl ConsoleTransport {
    /// Read from stdin, saving charts under `images_dir`
    pub fn new(images_dir: impl Into<PathBuf>) -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()), images_dir)
    }
}

impl<R: AsyncBufRead + Unpin + Send> ConsoleTransport<R> {
    pub fn from_reader(reader: R, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            lines: Mutex::new(reader.lines()),
            images_dir: images_dir.into(),
            images_written: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> ChatTransport for ConsoleTransport<R> {
    async fn poll(&mut self) -> Result<Option<Vec<InboundMessage>>> {
        let line = self
            .lines
            .get_mut()
            .next_line()
            .await
            .map_err(|e| BotError::Transport(format!("Failed to read input: {e}")))?;

        Ok(line.map(|text| {
            if text.trim().is_empty() {
                return Vec::new();
            }
            vec![InboundMessage {
                chat_id: CONSOLE_CHAT_ID,
                text,
            }]
        }))
    }

    async fn send_text(&self, _chat_id: i64, text: &str) -> Result<()> {
        println!("{text}\n");
        Ok(())
    }

    async fn send_image(&self, _chat_id: i64, png: Vec<u8>) -> Result<()> {
        let index = self.images_written.fetch_add(1, Ordering::Relaxed) + 1;
        let path = self.images_dir.join(format!("chart-{index}.png"));

        tokio::fs::create_dir_all(&self.images_dir)
            .await
            .map_err(|e| BotError::Transport(format!("{}: {e}", self.images_dir.display())))?;
        tokio::fs::write(&path, &png)
            .await
            .map_err(|e| BotError::Transport(format!("{}: {e}", path.display())))?;

        tracing::info!(path = %path.display(), bytes = png.len(), "Saved chart");
        println!("[image saved to {}]\n", path.display());
        Ok(())
    }
}
