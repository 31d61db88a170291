//! Telegram Bot API transport
//!
//! Long-polls `getUpdates` and answers with `sendMessage` / `sendPhoto`.
//! Request URLs embed the bot token, so errors are stripped of their URL
//! before being logged.

use super::{ChatTransport, InboundMessage};
use crate::error::{BotError, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Telegram bot configuration
#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot token from BotFather
    pub token: String,

    /// Bot API base URL
    pub api_url: String,

    /// Long polling timeout passed to `getUpdates`
    pub poll_timeout: Duration,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("poll_timeout", &self.poll_timeout)
            .finish()
    }
}

impl TelegramConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            poll_timeout: Duration::from_secs(30),
        }
    }

    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = ["TELEGRAM_BOT_TOKEN", "TOKEN"]
            .iter()
            .find_map(|k| lookup(*k).filter(|v| !v.trim().is_empty()))
            .ok_or_else(|| BotError::Config("TELEGRAM_BOT_TOKEN not set".to_string()))?;

        let mut config = Self::new(token.trim());
        if let Some(url) = lookup("TELEGRAM_API_URL").filter(|v| !v.trim().is_empty()) {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        Ok(config)
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

/// Telegram long-polling transport
pub struct TelegramTransport {
    client: Client,
    config: TelegramConfig,
    offset: Option<i64>,
}

impl TelegramTransport {
    pub fn new(config: TelegramConfig) -> Result<Self> {
        // getUpdates holds the connection open for poll_timeout
        let client = Client::builder()
            .timeout(config.poll_timeout + Duration::from_secs(10))
            .build()
            .map_err(|e| BotError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            offset: None,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.config.api_url, self.config.token)
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        let parsed: ApiResponse<T> = serde_json::from_str(&body).map_err(|e| {
            BotError::Transport(format!("{method}: unexpected response ({status}): {e}"))
        })?;

        if !parsed.ok {
            return Err(BotError::Transport(format!(
                "{method} failed: {}",
                parsed.description.unwrap_or_else(|| status.to_string())
            )));
        }

        parsed
            .result
            .ok_or_else(|| BotError::Transport(format!("{method}: response has no result")))
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn poll(&mut self) -> Result<Option<Vec<InboundMessage>>> {
        let mut query = vec![("timeout", self.config.poll_timeout.as_secs().to_string())];
        if let Some(offset) = self.offset {
            query.push(("offset", offset.to_string()));
        }

        let request = self.client.get(self.method_url("getUpdates")).query(&query);
        let updates: Vec<Update> = self.call("getUpdates", request).await?;

        let (messages, next_offset) = collect_messages(updates);
        if next_offset.is_some() {
            self.offset = next_offset;
        }
        tracing::debug!(messages = messages.len(), offset = ?self.offset, "Polled updates");

        Ok(Some(messages))
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        let request = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&json!({"chat_id": chat_id, "text": text}));
        let _: serde_json::Value = self.call("sendMessage", request).await?;
        Ok(())
    }

    async fn send_image(&self, chat_id: i64, png: Vec<u8>) -> Result<()> {
        let photo = Part::bytes(png)
            .file_name("chart.png")
            .mime_str("image/png")
            .map_err(transport_error)?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("photo", photo);

        let request = self.client.post(self.method_url("sendPhoto")).multipart(form);
        let _: serde_json::Value = self.call("sendPhoto", request).await?;
        Ok(())
    }
}

/// Text messages in update order and the offset acknowledging all of them
fn collect_messages(updates: Vec<Update>) -> (Vec<InboundMessage>, Option<i64>) {
    let next_offset = updates.iter().map(|u| u.update_id + 1).max();

    let messages = updates
        .into_iter()
        .filter_map(|update| {
            let message = update.message?;
            Some(InboundMessage {
                chat_id: message.chat.id,
                text: message.text?,
            })
        })
        .collect();

    (messages, next_offset)
}

fn transport_error(err: reqwest::Error) -> BotError {
    BotError::Transport(err.without_url().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_telegram_config_from_lookup() {
        let config = TelegramConfig::from_lookup(lookup(&[("TELEGRAM_BOT_TOKEN", "test_token")]))
            .unwrap();
        assert_eq!(config.token, "test_token");
        assert_eq!(config.api_url, DEFAULT_API_URL);

        let config = TelegramConfig::from_lookup(lookup(&[("TOKEN", "legacy")])).unwrap();
        assert_eq!(config.token, "legacy");
    }

    #[test]
    fn test_telegram_config_missing_token() {
        let result = TelegramConfig::from_lookup(lookup(&[]));
        assert!(matches!(result, Err(BotError::Config(_))));
    }

    #[test]
    fn test_debug_hides_token() {
        let config = TelegramConfig::new("123:secret");
        assert!(!format!("{config:?}").contains("secret"));
    }

    #[test]
    fn test_method_url() {
        let mut config = TelegramConfig::new("123:abc");
        config.api_url = "http://localhost:8081".to_string();
        let transport = TelegramTransport::new(config).unwrap();
        assert_eq!(
            transport.method_url("getUpdates"),
            "http://localhost:8081/bot123:abc/getUpdates"
        );
    }

    #[test]
    fn test_collect_messages() {
        let body = r#"{"ok": true, "result": [
            {"update_id": 10, "message": {"message_id": 1, "chat": {"id": 42, "type": "private"}, "text": "цена"}},
            {"update_id": 11, "message": {"message_id": 2, "chat": {"id": 42, "type": "private"}, "photo": []}},
            {"update_id": 12, "edited_message": {"message_id": 1, "chat": {"id": 42}, "text": "x"}},
            {"update_id": 13, "message": {"message_id": 3, "chat": {"id": -7, "type": "group"}, "text": "/start"}}
        ]}"#;
        let response: ApiResponse<Vec<Update>> = serde_json::from_str(body).unwrap();
        assert!(response.ok);

        let (messages, offset) = collect_messages(response.result.unwrap());
        assert_eq!(
            messages,
            vec![
                InboundMessage {
                    chat_id: 42,
                    text: "цена".to_string()
                },
                InboundMessage {
                    chat_id: -7,
                    text: "/start".to_string()
                },
            ]
        );
        assert_eq!(offset, Some(14));
    }

    #[test]
    fn test_collect_no_updates() {
        let (messages, offset) = collect_messages(vec![]);
        assert!(messages.is_empty());
        assert_eq!(offset, None);
    }

    #[test]
    fn test_error_response_shape() {
        let body = r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#;
        let response: ApiResponse<Vec<Update>> = serde_json::from_str(body).unwrap();
        assert!(!response.ok);
        assert_eq!(response.description.as_deref(), Some("Unauthorized"));
    }
}
