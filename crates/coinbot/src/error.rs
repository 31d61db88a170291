//! Error types for bot operations

use thiserror::Error;

/// Errors raised while answering a chat message
#[derive(Debug, Error)]
pub enum BotError {
    /// Network failure, timeout or non-2xx status from an external service
    #[error("Remote service error: {0}")]
    RemoteService(String),

    /// Upstream throttled the request
    #[error("Rate limit exceeded for {provider}")]
    RateLimited { provider: String },

    /// Response body is missing an expected field or cannot be parsed
    #[error("Data format error: {0}")]
    DataFormat(String),

    /// Malformed user input
    #[error("Format error: {0}")]
    Format(String),

    /// No exchange rate between the two currencies
    #[error("Exchange rate {from}->{to} not found")]
    ConversionUnavailable { from: String, to: String },

    /// Chart drawing or PNG encoding failed
    #[error("Render error: {0}")]
    Render(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Chat transport failure
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type alias for bot operations
pub type Result<T> = std::result::Result<T, BotError>;

impl From<reqwest::Error> for BotError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BotError::DataFormat(err.to_string())
        } else {
            BotError::RemoteService(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BotError {
    fn from(err: serde_json::Error) -> Self {
        BotError::DataFormat(err.to_string())
    }
}

impl From<quick_xml::DeError> for BotError {
    fn from(err: quick_xml::DeError) -> Self {
        BotError::DataFormat(err.to_string())
    }
}

impl BotError {
    /// Short notice shown to the chat user in place of a result
    pub fn user_notice(&self) -> String {
        match self {
            BotError::RemoteService(_) => {
                "Сервис данных недоступен, попробуйте позже.".to_string()
            }
            BotError::RateLimited { .. } => {
                "Превышен лимит запросов к сервису данных, попробуйте позже.".to_string()
            }
            BotError::DataFormat(_) => {
                "Не удалось обработать ответ сервиса данных.".to_string()
            }
            BotError::Render(_) => "Не удалось построить график.".to_string(),
            BotError::Format(reason) => {
                format!("{reason}\nИспользование: convert <количество> <код валюты>, например: convert 2 EUR")
            }
            BotError::ConversionUnavailable { from, to } => {
                format!("Невозможно найти обменный курс между {from} и {to}.")
            }
            BotError::Config(_) | BotError::Transport(_) => {
                "Внутренняя ошибка бота.".to_string()
            }
        }
    }
}
