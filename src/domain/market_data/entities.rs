use super::value_objects::Symbol;
use crate::domain::chart::value_objects::RangeIndex;
use crate::domain::events::{Listeners, QuoteEvent, SubscriptionId};
use crate::domain::logging::LogComponent;
use crate::log_debug;
use serde::{Deserialize, Serialize};

/// Domain entity - one OHLCV sample.
///
/// `index` is the position inside the owning [`QuoteStore`] and is
/// rewritten by the store after every splice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
    /// Unix seconds
    pub timestamp: f64,
    #[serde(default)]
    pub index: usize,
}

impl Quote {
    pub fn new(timestamp: f64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
            volume,
            timestamp,
            index: 0,
        }
    }

    /// Flat quote, handy for line data and streaming ticks.
    pub fn from_price(timestamp: f64, price: f64) -> Self {
        Self::new(timestamp, price, price, price, price, 0.0)
    }

    pub fn is_positive(&self) -> bool {
        self.close >= self.open
    }
}

/// Result of [`QuoteStore::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddOutcome {
    /// The buffer was empty before the call.
    pub first_load: bool,
    pub added: usize,
    /// Tail quotes discarded because the batch overlapped them.
    pub replaced: usize,
    /// Head quotes dropped to honor `max_count`.
    pub trimmed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpdateOutcome {
    /// The tick was newer than the last quote and became a new quote.
    Appended(AddOutcome),
    /// The tick was merged into the last quote.
    Merged(Quote),
}

/// Ordered quote buffer for one symbol/interval pair.
#[derive(Debug)]
pub struct QuoteStore {
    quotes: Vec<Quote>,
    symbol: Option<Symbol>,
    interval: u32,
    decimals: u32,
    max_count: usize,
    listeners: Listeners<QuoteEvent>,
}

impl QuoteStore {
    pub fn new(interval: u32, decimals: u32, max_count: usize) -> Self {
        Self {
            quotes: Vec::new(),
            symbol: None,
            interval,
            decimals,
            max_count,
            listeners: Listeners::new(),
        }
    }

    /// Merge an ordered batch into the buffer.
    ///
    /// Existing tail quotes at or after the first incoming timestamp are
    /// discarded, the batch is appended and the oldest quotes are trimmed
    /// down to `max_count`. Batches must be sorted by timestamp.
    pub fn add<I>(&mut self, incoming: I) -> AddOutcome
    where
        I: IntoIterator<Item = Quote>,
    {
        let incoming: Vec<Quote> = incoming.into_iter().collect();
        let Some(first) = incoming.first() else {
            return AddOutcome::default();
        };

        let first_load = self.quotes.is_empty();
        let keep = self.quotes.partition_point(|q| q.timestamp < first.timestamp);
        let replaced = self.quotes.len() - keep;
        self.quotes.truncate(keep);

        let added = incoming.len();
        self.quotes.extend(incoming);

        let trimmed = self.trim_to_max();
        // trimming shifts every survivor
        self.reindex(if trimmed > 0 { 0 } else { keep });

        if trimmed > 0 {
            log_debug!(
                LogComponent::Domain("QuoteStore"),
                "dropped {} oldest quotes, keeping {}",
                trimmed,
                self.quotes.len()
            );
        }

        let outcome = AddOutcome {
            first_load,
            added,
            replaced,
            trimmed,
        };
        self.listeners.publish(&QuoteEvent::QuotesAdded {
            first_load,
            count: self.quotes.len(),
        });
        outcome
    }

    /// Apply a streaming tick to the in-progress quote.
    pub fn update_last(&mut self, quote: Quote) -> UpdateOutcome {
        let Some(last) = self.quotes.last_mut() else {
            return UpdateOutcome::Appended(self.add([quote]));
        };
        if quote.timestamp > last.timestamp {
            return UpdateOutcome::Appended(self.add([quote]));
        }

        last.high = last.high.max(quote.high);
        last.low = last.low.min(quote.low);
        last.close = quote.close;
        let merged = *last;

        self.listeners
            .publish(&QuoteEvent::LastQuoteUpdated { quote: merged });
        UpdateOutcome::Merged(merged)
    }

    /// Inclusive slice over `range`. Callers clamp with the latest metrics,
    /// an out-of-bounds range is a contract violation.
    pub fn quotes(&self, range: RangeIndex) -> &[Quote] {
        let valid = range.start <= range.end && range.end < self.quotes.len();
        debug_assert!(
            valid,
            "quote range {:?} out of bounds for {} quotes",
            range,
            self.quotes.len()
        );
        if !valid {
            return &[];
        }
        &self.quotes[range.start..=range.end]
    }

    /// First quote inside `range` whose timestamp is at or after `timestamp`.
    ///
    /// The scan starts from a linear interpolation of the timestamp inside
    /// the range, which lands next to the answer for evenly sampled data.
    pub fn quote_at_or_after(&self, timestamp: f64, range: RangeIndex) -> Option<&Quote> {
        if range.start > range.end || range.end >= self.quotes.len() {
            return None;
        }
        let slice = &self.quotes[range.start..=range.end];
        let (t_low, t_high) = (slice[0].timestamp, slice[slice.len() - 1].timestamp);
        if timestamp > t_high {
            return None;
        }

        let last = slice.len() - 1;
        let mut idx = if t_high > t_low {
            let ratio = ((timestamp - t_low) / (t_high - t_low)).clamp(0.0, 1.0);
            ((last as f64 * ratio) as usize).saturating_sub(10)
        } else {
            0
        };
        while idx > 0 && slice[idx - 1].timestamp >= timestamp {
            idx -= 1;
        }
        slice[idx..].iter().find(|q| q.timestamp >= timestamp)
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&QuoteEvent) + 'static,
    {
        self.listeners.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn clear(&mut self) {
        if self.quotes.is_empty() {
            return;
        }
        self.quotes.clear();
        self.listeners.publish(&QuoteEvent::Cleared);
    }

    /// A new symbol is a disjoint series, so the buffer is cleared.
    pub fn set_symbol(&mut self, symbol: Symbol) {
        if self.symbol.as_ref() != Some(&symbol) {
            self.symbol = Some(symbol);
            self.clear();
        }
    }

    pub fn set_interval(&mut self, interval: u32) {
        if self.interval != interval {
            self.interval = interval;
            self.clear();
        }
    }

    pub fn set_decimals(&mut self, decimals: u32) {
        self.decimals = decimals;
    }

    pub fn set_max_count(&mut self, max_count: usize) {
        self.max_count = max_count;
        if self.trim_to_max() > 0 {
            self.reindex(0);
        }
    }

    pub fn symbol(&self) -> Option<&Symbol> {
        self.symbol.as_ref()
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    pub fn max_count(&self) -> usize {
        self.max_count
    }

    pub fn all(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn get(&self, index: usize) -> Option<&Quote> {
        self.quotes.get(index)
    }

    pub fn first(&self) -> Option<&Quote> {
        self.quotes.first()
    }

    pub fn last(&self) -> Option<&Quote> {
        self.quotes.last()
    }

    pub fn count(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.quotes.len().checked_sub(1)
    }

    fn trim_to_max(&mut self) -> usize {
        if self.max_count == 0 || self.quotes.len() <= self.max_count {
            return 0;
        }
        let excess = self.quotes.len() - self.max_count;
        self.quotes.drain(..excess);
        excess
    }

    fn reindex(&mut self, from: usize) {
        for (i, quote) in self.quotes.iter_mut().enumerate().skip(from) {
            quote.index = i;
        }
    }
}

impl Default for QuoteStore {
    fn default() -> Self {
        Self::new(60, 2, 0)
    }
}
