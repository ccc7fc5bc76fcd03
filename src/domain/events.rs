use crate::domain::chart::value_objects::{ChartStyle, PriceDirection};
use crate::domain::market_data::Quote;
use serde::Serialize;
use std::fmt::Debug;

/// Base trait for all domain events
pub trait DomainEvent: Debug + Clone {
    fn event_type(&self) -> &'static str;
}

/// Emitted by a `QuoteStore` after its buffer changed.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteEvent {
    QuotesAdded { first_load: bool, count: usize },
    LastQuoteUpdated { quote: Quote },
    Cleared,
}

impl DomainEvent for QuoteEvent {
    fn event_type(&self) -> &'static str {
        match self {
            QuoteEvent::QuotesAdded { .. } => "QuotesAdded",
            QuoteEvent::LastQuoteUpdated { .. } => "LastQuoteUpdated",
            QuoteEvent::Cleared => "Cleared",
        }
    }
}

/// Emitted by a chart view towards its host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum ChartEvent {
    SelectedQuote(Quote),
    SelectionCleared,
    PriceDirectionChanged(PriceDirection),
    StyleChanged(ChartStyle),
    VerticalScaleButtonVisibility(bool),
}

impl DomainEvent for ChartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ChartEvent::SelectedQuote(_) => "SelectedQuote",
            ChartEvent::SelectionCleared => "SelectionCleared",
            ChartEvent::PriceDirectionChanged(_) => "PriceDirectionChanged",
            ChartEvent::StyleChanged(_) => "StyleChanged",
            ChartEvent::VerticalScaleButtonVisibility(_) => "VerticalScaleButtonVisibility",
        }
    }
}

/// Handle returned by [`Listeners::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Typed, instance-scoped observer list. Each chart owns its own,
/// nothing is shared between instances.
pub struct Listeners<E: DomainEvent> {
    next_id: u64,
    handlers: Vec<(SubscriptionId, Box<dyn FnMut(&E)>)>,
}

impl<E: DomainEvent> Listeners<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            handlers: Vec::new(),
        }
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&E) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        self.handlers.len() != before
    }

    pub fn publish(&mut self, event: &E) {
        for (_, handler) in self.handlers.iter_mut() {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<E: DomainEvent> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DomainEvent> Debug for Listeners<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
