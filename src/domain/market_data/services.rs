use super::entities::Quote;
use crate::domain::errors::{AppError, AppResult};

/// Domain service validating incoming quotes
#[derive(Debug, Clone, Copy, Default)]
pub struct DataValidationService;

impl DataValidationService {
    pub fn new() -> Self {
        Self
    }

    /// OHLC consistency: finite, non-negative, high/low enclose open/close.
    pub fn validate_quote(&self, quote: &Quote) -> AppResult<()> {
        let fields = [
            quote.open,
            quote.high,
            quote.low,
            quote.close,
            quote.volume,
            quote.timestamp,
        ];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(AppError::ValidationError(format!(
                "non-finite field in quote at {}",
                quote.timestamp
            )));
        }
        if quote.low < 0.0 || quote.volume < 0.0 || quote.timestamp < 0.0 {
            return Err(AppError::ValidationError(format!(
                "negative field in quote at {}",
                quote.timestamp
            )));
        }
        let body_high = quote.open.max(quote.close);
        let body_low = quote.open.min(quote.close);
        if quote.high < body_high || quote.low > body_low {
            return Err(AppError::ValidationError(format!(
                "high/low do not enclose open/close at {}",
                quote.timestamp
            )));
        }
        Ok(())
    }

    /// Batches handed to the store must not go back in time.
    pub fn validate_sequence(&self, quotes: &[Quote]) -> AppResult<()> {
        for pair in quotes.windows(2) {
            if pair[1].timestamp < pair[0].timestamp {
                return Err(AppError::ValidationError(format!(
                    "timestamps go backwards: {} after {}",
                    pair[1].timestamp, pair[0].timestamp
                )));
            }
        }
        Ok(())
    }
}
