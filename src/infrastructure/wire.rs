//! Provider JSON to quotes. Accepts a bare array of candles or the
//! `{"Data": [...]}` envelope used by histo endpoints.

use serde::Deserialize;

use crate::domain::errors::{AppError, AppResult};
use crate::domain::logging::LogComponent;
use crate::domain::market_data::{DataValidationService, Quote};
use crate::log_warn;

#[derive(Debug, Clone, Deserialize)]
pub struct WireQuote {
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    #[serde(default, alias = "volumefrom")]
    pub volume: Option<f64>,
    #[serde(alias = "time")]
    pub timestamp: Option<f64>,
}

impl WireQuote {
    /// `None` when a price field is missing. Volume defaults to 0.
    pub fn into_quote(self) -> Option<Quote> {
        Some(Quote::new(
            self.timestamp?,
            self.open?,
            self.high?,
            self.low?,
            self.close?,
            self.volume.unwrap_or_default(),
        ))
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WirePayload {
    Envelope {
        #[serde(rename = "Data")]
        data: Vec<WireQuote>,
    },
    List(Vec<WireQuote>),
}

/// Parses and validates a batch. Incomplete or inconsistent entries are
/// skipped with a warning, a batch going back in time is rejected.
pub fn parse_quotes(json: &str) -> AppResult<Vec<Quote>> {
    let payload: WirePayload = serde_json::from_str(json)?;
    let raw = match payload {
        WirePayload::Envelope { data } => data,
        WirePayload::List(list) => list,
    };

    let validator = DataValidationService::new();
    let mut quotes = Vec::with_capacity(raw.len());
    for (position, entry) in raw.into_iter().enumerate() {
        let Some(quote) = entry.into_quote() else {
            log_warn!(
                LogComponent::Infrastructure("Wire"),
                "skipping entry {}: missing field",
                position
            );
            continue;
        };
        if let Err(err) = validator.validate_quote(&quote) {
            log_warn!(
                LogComponent::Infrastructure("Wire"),
                "skipping entry {}: {}",
                position,
                err
            );
            continue;
        }
        quotes.push(quote);
    }

    validator
        .validate_sequence(&quotes)
        .map_err(|err| AppError::ParseError(err.to_string()))?;
    Ok(quotes)
}
