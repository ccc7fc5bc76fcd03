use std::cell::RefCell;
use std::rc::Rc;

use coin_chart_wasm::domain::chart::RangeIndex;
use coin_chart_wasm::domain::events::QuoteEvent;
use coin_chart_wasm::domain::market_data::{Quote, QuoteStore, Symbol, UpdateOutcome};
use quickcheck_macros::quickcheck;

const MINUTE: f64 = 60.0;

fn minute_quotes(start: usize, count: usize) -> Vec<Quote> {
    (start..start + count)
        .map(|i| {
            let price = 100.0 + (i % 17) as f64;
            Quote::new(i as f64 * MINUTE, price, price + 2.0, price - 2.0, price + 1.0, 10.0)
        })
        .collect()
}

fn is_ordered_and_indexed(store: &QuoteStore) -> bool {
    let quotes = store.all();
    quotes.windows(2).all(|w| w[0].timestamp <= w[1].timestamp)
        && quotes.iter().enumerate().all(|(i, q)| q.index == i)
}

/// Reference merge used to check the store: drop the tail at or after the
/// first incoming timestamp, append, keep the newest `max`.
fn model_add(model: &mut Vec<f64>, batch: &[f64], max: usize) {
    let Some(first) = batch.first() else {
        return;
    };
    model.retain(|ts| ts < first);
    model.extend_from_slice(batch);
    if max > 0 && model.len() > max {
        model.drain(..model.len() - max);
    }
}

fn sorted_batch(raw: Vec<u16>) -> Vec<f64> {
    let mut batch: Vec<f64> = raw.into_iter().map(f64::from).collect();
    batch.sort_by(f64::total_cmp);
    batch
}

#[quickcheck]
fn add_keeps_order_and_indices(batches: Vec<Vec<u16>>) -> bool {
    let mut store = QuoteStore::new(60, 2, 0);
    for raw in batches {
        store.add(sorted_batch(raw).into_iter().map(|ts| Quote::from_price(ts, 1.0)));
        if !is_ordered_and_indexed(&store) {
            return false;
        }
    }
    true
}

#[quickcheck]
fn add_keeps_the_most_recent_quotes(batches: Vec<Vec<u16>>, max: u8) -> bool {
    let max = max as usize;
    let mut store = QuoteStore::new(60, 2, max);
    let mut model = Vec::new();
    for raw in batches {
        let batch = sorted_batch(raw);
        model_add(&mut model, &batch, max);
        store.add(batch.into_iter().map(|ts| Quote::from_price(ts, 1.0)));

        if max > 0 && store.count() > max {
            return false;
        }
        let kept: Vec<f64> = store.all().iter().map(|q| q.timestamp).collect();
        if kept != model {
            return false;
        }
    }
    true
}

#[quickcheck]
fn redelivered_tail_never_duplicates(count: u8, close: u16) -> bool {
    let count = count as usize + 1;
    let mut store = QuoteStore::new(60, 2, 0);
    store.add(minute_quotes(0, count));
    let Some(last) = store.last().copied() else {
        return false;
    };

    let redelivered = Quote::new(last.timestamp, 1.0, 5.0, 0.5, f64::from(close), 3.0);
    store.add([redelivered]);
    store.add([redelivered]);

    let tail = store.last().copied();
    store.count() == count
        && tail.is_some_and(|q| q.close == f64::from(close) && q.high == 5.0 && q.index == count - 1)
}

#[test]
fn update_last_widens_and_replaces_close() {
    let mut store = QuoteStore::new(60, 2, 0);
    store.add([Quote::new(0.0, 7.0, 10.0, 5.0, 8.0, 1.0)]);

    let outcome = store.update_last(Quote::new(0.0, 7.0, 9.0, 6.0, 7.0, 1.0));
    let UpdateOutcome::Merged(merged) = outcome else {
        panic!("same timestamp must merge, got {outcome:?}");
    };
    assert_eq!((merged.high, merged.low, merged.close), (10.0, 5.0, 7.0));
    assert_eq!(store.count(), 1);
}

#[test]
fn update_last_appends_newer_quote_verbatim() {
    let mut store = QuoteStore::new(60, 2, 0);
    store.add([Quote::new(0.0, 7.0, 10.0, 5.0, 8.0, 1.0)]);

    let newer = Quote::new(60.0, 14.0, 20.0, 1.0, 15.0, 2.0);
    assert!(matches!(store.update_last(newer), UpdateOutcome::Appended(_)));
    assert_eq!(store.count(), 2);

    let last = store.last().copied().unwrap();
    assert_eq!(
        (last.open, last.high, last.low, last.close, last.volume, last.timestamp),
        (14.0, 20.0, 1.0, 15.0, 2.0, 60.0)
    );
    assert_eq!(last.index, 1);
}

#[test]
fn overlapping_batch_replaces_the_tail() {
    let mut store = QuoteStore::new(60, 2, 0);
    store.add(minute_quotes(0, 10));
    let outcome = store.add(minute_quotes(7, 5));

    assert_eq!(outcome.replaced, 3);
    assert_eq!(outcome.added, 5);
    assert!(!outcome.first_load);
    assert_eq!(store.count(), 12);
    assert!(is_ordered_and_indexed(&store));
}

#[test]
fn first_load_and_trim_are_reported() {
    let mut store = QuoteStore::new(60, 2, 800);
    let first = store.add(minute_quotes(0, 300));
    assert!(first.first_load);
    assert_eq!(first.trimmed, 0);

    let second = store.add(minute_quotes(300, 600));
    assert!(!second.first_load);
    assert_eq!(second.trimmed, 100);
    assert_eq!(store.count(), 800);
    assert_eq!(store.first().map(|q| q.timestamp), Some(100.0 * MINUTE));
}

#[test]
fn quote_at_or_after_finds_the_next_quote() {
    let mut store = QuoteStore::new(60, 2, 0);
    store.add(minute_quotes(0, 100));
    let range = RangeIndex::new(10, 90);

    assert_eq!(store.quote_at_or_after(30.0 * MINUTE, range).map(|q| q.index), Some(30));
    assert_eq!(store.quote_at_or_after(30.5 * MINUTE, range).map(|q| q.index), Some(31));
    assert_eq!(store.quote_at_or_after(0.0, range).map(|q| q.index), Some(10));
    assert!(store.quote_at_or_after(95.0 * MINUTE, range).is_none());
}

#[test]
fn listeners_see_store_changes() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut store = QuoteStore::new(60, 2, 0);
    let sink = Rc::clone(&seen);
    store.subscribe(move |event: &QuoteEvent| sink.borrow_mut().push(event.clone()));

    store.add(minute_quotes(0, 3));
    store.update_last(Quote::from_price(2.0 * MINUTE, 200.0));
    store.set_symbol(Symbol::new("ethusd").unwrap());

    let seen = seen.borrow();
    assert_eq!(
        seen[0],
        QuoteEvent::QuotesAdded {
            first_load: true,
            count: 3
        }
    );
    assert!(matches!(seen[1], QuoteEvent::LastQuoteUpdated { quote } if quote.close == 200.0));
    assert_eq!(seen[2], QuoteEvent::Cleared);
    assert!(store.is_empty());
}

#[test]
fn shrinking_max_count_trims_immediately() {
    let mut store = QuoteStore::new(60, 2, 0);
    store.add(minute_quotes(0, 50));
    store.set_max_count(20);
    assert_eq!(store.count(), 20);
    assert_eq!(store.first().map(|q| q.index), Some(0));
    assert_eq!(store.first().map(|q| q.timestamp), Some(30.0 * MINUTE));
}
