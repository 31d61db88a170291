//! Command parsing for inbound chat text
//!
//! Text is trimmed and lowercased, then matched against a fixed keyword
//! table. Anything unrecognized (including `/start` and `/help`) maps to the
//! greeting.

use crate::error::{BotError, Result};
use crate::lookups::ConvertRequest;

/// Greeting and help text listing the supported keywords
pub const GREETING: &str = "Привет! Я могу сообщить вам текущую цену биткоина, \
отобразить график цен и дать последние новости. Просто напишите \
\"цена\", \"график\", \"новости\" или \"convert <количество> <код валюты>\" \
(например, \"convert 2 EUR\"; также можно \"перевести 2 EUR\") \
для конвертации биткоина в другую валюту.";

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Current BTC price
    Price,
    /// Latest news headlines
    News,
    /// Historical price chart
    Chart,
    /// Convert a BTC amount into another currency
    Convert(ConvertRequest),
    /// Anything else
    Greeting,
}

impl Command {
    /// Parse a command from user input
    ///
    /// Only a convert command with a wrong argument count or an invalid
    /// amount fails; every other input parses.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim().to_lowercase();

        match input.as_str() {
            "цена" => return Ok(Command::Price),
            "новости" => return Ok(Command::News),
            "график" => return Ok(Command::Chart),
            _ => {}
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        let Some((cmd, args)) = parts.split_first() else {
            return Ok(Command::Greeting);
        };

        match *cmd {
            "convert" | "перевести" => match args {
                [amount, code] => Ok(Command::Convert(ConvertRequest::parse(amount, code)?)),
                _ => Err(BotError::Format(format!(
                    "Команда {cmd} ожидает два аргумента, получено: {}",
                    args.len()
                ))),
            },
            _ => Ok(Command::Greeting),
        }
    }

    /// Short name used in log fields
    pub fn name(&self) -> &'static str {
        match self {
            Command::Price => "price",
            Command::News => "news",
            Command::Chart => "chart",
            Command::Convert(_) => "convert",
            Command::Greeting => "greeting",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_keywords() {
        assert_eq!(Command::parse("цена").unwrap(), Command::Price);
        assert_eq!(Command::parse("новости").unwrap(), Command::News);
        assert_eq!(Command::parse("график").unwrap(), Command::Chart);
    }

    #[test]
    fn test_parse_case_insensitive() {
        for input in ["ЦЕНА", "цена", "Цена", "  цена \n"] {
            assert_eq!(Command::parse(input).unwrap(), Command::Price, "{input:?}");
        }
        assert_eq!(Command::parse("ГрАфИк").unwrap(), Command::Chart);
    }

    #[test]
    fn test_parse_convert() {
        let cmd = Command::parse("convert 2 eur").unwrap();
        assert_eq!(
            cmd,
            Command::Convert(ConvertRequest {
                amount: dec!(2),
                target: "EUR".to_string()
            })
        );

        let cmd = Command::parse("Перевести 0.5 RUB").unwrap();
        assert_eq!(
            cmd,
            Command::Convert(ConvertRequest {
                amount: dec!(0.5),
                target: "RUB".to_string()
            })
        );
    }

    #[test]
    fn test_parse_convert_wrong_arity() {
        assert!(matches!(Command::parse("convert 5"), Err(BotError::Format(_))));
        assert!(matches!(Command::parse("convert"), Err(BotError::Format(_))));
        assert!(matches!(
            Command::parse("convert 1 EUR USD"),
            Err(BotError::Format(_))
        ));
    }

    #[test]
    fn test_parse_convert_bad_amount() {
        assert!(matches!(
            Command::parse("convert abc EUR"),
            Err(BotError::Format(_))
        ));
        assert!(matches!(
            Command::parse("convert -2 EUR"),
            Err(BotError::Format(_))
        ));
    }

    #[test]
    fn test_parse_greeting() {
        for input in ["/start", "/help", "привет", "", "цена биткоина", "prices"] {
            assert_eq!(Command::parse(input).unwrap(), Command::Greeting, "{input:?}");
        }
    }

    #[test]
    fn test_greeting_lists_keywords() {
        for keyword in ["цена", "график", "новости", "convert"] {
            assert!(GREETING.contains(keyword));
        }
    }
}
