use crate::domain::errors::{AppError, AppResult};
use derive_more::{Deref, Display};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString, IntoEnumIterator};

/// Value Object - торговый символ (BTC, ETH, ...), всегда в верхнем регистре
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deref, Display, Serialize, Deserialize)]
#[display(fmt = "{}", _0)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(symbol: &str) -> AppResult<Self> {
        let trimmed = symbol.trim();
        if trimmed.is_empty() {
            return Err(AppError::ValidationError("Symbol cannot be empty".to_string()));
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(AppError::ValidationError(format!(
                "Symbol contains unsupported characters: {}",
                trimmed
            )));
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Value Object - интервал между котировками
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumIter, EnumString, AsRefStr, Serialize, Deserialize,
)]
pub enum TimeInterval {
    #[strum(serialize = "1m")]
    #[serde(rename = "1m")]
    OneMinute,

    #[strum(serialize = "5m")]
    #[serde(rename = "5m")]
    FiveMinutes,

    #[strum(serialize = "15m")]
    #[serde(rename = "15m")]
    FifteenMinutes,

    #[strum(serialize = "30m")]
    #[serde(rename = "30m")]
    ThirtyMinutes,

    #[strum(serialize = "1h")]
    #[serde(rename = "1h")]
    OneHour,

    #[strum(serialize = "4h")]
    #[serde(rename = "4h")]
    FourHours,

    #[strum(serialize = "1d")]
    #[serde(rename = "1d")]
    OneDay,

    #[strum(serialize = "1w")]
    #[serde(rename = "1w")]
    OneWeek,
}

impl TimeInterval {
    pub fn seconds(&self) -> u32 {
        match self {
            Self::OneMinute => 60,
            Self::FiveMinutes => 5 * 60,
            Self::FifteenMinutes => 15 * 60,
            Self::ThirtyMinutes => 30 * 60,
            Self::OneHour => 60 * 60,
            Self::FourHours => 4 * 60 * 60,
            Self::OneDay => 24 * 60 * 60,
            Self::OneWeek => 7 * 24 * 60 * 60,
        }
    }

    pub fn from_seconds(seconds: u32) -> Option<Self> {
        Self::iter().find(|interval| interval.seconds() == seconds)
    }

    pub fn parse(value: &str) -> AppResult<Self> {
        value
            .parse()
            .map_err(|_| AppError::ParseError(format!("Unknown interval: {}", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_is_normalized() {
        let symbol = Symbol::new(" btc ").unwrap();
        assert_eq!(symbol.value(), "BTC");
        assert!(Symbol::new("").is_err());
        assert!(Symbol::new("bt c").is_err());
    }

    #[test]
    fn intervals_round_trip_through_seconds_and_names() {
        for interval in TimeInterval::iter() {
            assert_eq!(TimeInterval::from_seconds(interval.seconds()), Some(interval));
            assert_eq!(TimeInterval::parse(interval.as_ref()).unwrap(), interval);
        }
        assert!(TimeInterval::parse("7m").is_err());
    }
}
