use coin_chart_wasm::domain::chart::{
    ChartSettings, ChartStyle, MetricsY, NumberFormat, Point, RangeIndex, Rect, Size,
};
use coin_chart_wasm::domain::market_data::{Quote, QuoteStore};
use coin_chart_wasm::infrastructure::rendering::{GesturePhase, SelectionMarker, SelectionOverlay};

fn store(count: usize) -> QuoteStore {
    let mut store = QuoteStore::new(60, 2, 0);
    store.add((0..count).map(|i| {
        let p = 100.0 + i as f64;
        Quote::new(1_610_031_600.0 + i as f64 * 60.0, p, p + 2.0, p - 2.0, p + 1.0, 5.0)
    }));
    store
}

/// x_delta 10, visible range [5, 20], scrolled by 50px.
fn scrolled_metrics() -> MetricsY {
    MetricsY {
        high: 130.0,
        low: 90.0,
        x_delta: 10.0,
        point_width: 8.0,
        point_margin: 2.0,
        range: RangeIndex::new(5, 20),
        frame_size: Size::new(160.0, 100.0),
        frame_offset: 50.0,
        count: 30,
        ..MetricsY::default()
    }
}

#[test]
fn pointer_resolves_to_the_slot_under_it() {
    let metrics = scrolled_metrics();
    assert_eq!(metrics.index_at(47.0), Some(9));
    assert_eq!(metrics.index_at(0.0), Some(5));
    assert_eq!(metrics.index_at(159.0), Some(20));
}

#[test]
fn pointer_outside_the_range_selects_nothing() {
    let metrics = scrolled_metrics();
    assert_eq!(metrics.index_at(-1.0), None);
    assert_eq!(metrics.index_at(160.0), None);
    assert_eq!(metrics.index_at(-60.0), None);
}

#[test]
fn column_marker_for_candles() {
    let store = store(30);
    let metrics = scrolled_metrics();
    let mut overlay = SelectionOverlay::new();

    let quote = overlay.handle(
        GesturePhase::Began,
        Point::new(47.0, 40.0),
        &store,
        &metrics,
        ChartStyle::Candlestick,
        &ChartSettings::default(),
        NumberFormat::new(2, false),
    );
    assert_eq!(quote.map(|q| q.index), Some(9));
    assert_eq!(overlay.marker(), Some(&SelectionMarker::Column(Rect::new(40.0, 0.0, 10.0, 100.0))));

    let info = overlay.info().expect("info box");
    assert_eq!(info.lines[0], "O: 109.00");
    assert_eq!(info.lines[3], "C: 110.00");
    assert_eq!(info.lines[4], "07 Jan 2021 15:09");
}

#[test]
fn crosshair_for_lines_follows_the_close() {
    let store = store(30);
    let metrics = scrolled_metrics();
    let mut overlay = SelectionOverlay::new();
    let settings = ChartSettings {
        selection_show_quote_info: false,
        ..ChartSettings::default()
    };

    overlay.handle(
        GesturePhase::Changed,
        Point::new(47.0, 40.0),
        &store,
        &metrics,
        ChartStyle::Line,
        &settings,
        NumberFormat::default(),
    );
    let Some(SelectionMarker::Crosshair { vertical, horizontal }) = overlay.marker() else {
        panic!("expected a crosshair");
    };
    assert_eq!(vertical.0.x, 40.0);
    assert_eq!(horizontal.0.y, metrics.y_pos(110.0));
    assert!(overlay.info().is_none());
}

#[test]
fn gesture_end_hides_the_overlay() {
    let store = store(30);
    let metrics = scrolled_metrics();
    let mut overlay = SelectionOverlay::new();
    let settings = ChartSettings::default();

    overlay.handle(GesturePhase::Began, Point::new(47.0, 40.0), &store, &metrics, ChartStyle::Bar, &settings, NumberFormat::default());
    assert!(overlay.is_visible());

    let ended = overlay.handle(GesturePhase::Ended, Point::new(47.0, 40.0), &store, &metrics, ChartStyle::Bar, &settings, NumberFormat::default());
    assert!(ended.is_none());
    assert!(!overlay.is_visible());
    assert!(overlay.quote().is_none());

    overlay.handle(GesturePhase::Began, Point::new(47.0, 40.0), &store, &metrics, ChartStyle::Bar, &settings, NumberFormat::default());
    let off = overlay.handle(GesturePhase::Changed, Point::new(500.0, 40.0), &store, &metrics, ChartStyle::Bar, &settings, NumberFormat::default());
    assert!(off.is_none());
    assert!(!overlay.is_visible());
}
