use coin_chart_wasm::domain::chart::{BoundsType, MetricsRequest, MetricsY, Size, price_ticks};
use coin_chart_wasm::domain::market_data::{Quote, QuoteStore};
use quickcheck_macros::quickcheck;

fn wave_quotes(start: usize, count: usize) -> Vec<Quote> {
    (start..start + count)
        .map(|i| {
            let base = 1000.0 + (i as f64 * 0.37).sin() * 50.0 + (i % 11) as f64;
            Quote::new(i as f64 * 60.0, base, base + 4.0 + (i % 5) as f64, base - 3.0, base + 1.5, (i % 13) as f64)
        })
        .collect()
}

fn brute_bounds(quotes: &[Quote], bounds_type: BoundsType) -> (f64, f64) {
    quotes.iter().fold((f64::MIN, f64::MAX), |(high, low), q| {
        let (h, l) = match bounds_type {
            BoundsType::Close => (q.close, q.close),
            BoundsType::HighLow => (q.high, q.low),
            BoundsType::Volume => (q.volume, q.volume),
        };
        (high.max(h), low.min(l))
    })
}

fn candle_request(width: f64, offset: f64) -> MetricsRequest {
    MetricsRequest {
        min_point_width: Some(5.0),
        min_point_margin: 1.0,
        ..MetricsRequest::new(Size::new(width, 300.0), offset)
    }
}

#[quickcheck]
fn bounds_match_a_brute_force_scan(count: u16, offset: u16, width: u16, close_only: bool) -> bool {
    let count = count as usize % 2000 + 1;
    let width = f64::from(width % 1500) + 10.0;
    let mut store = QuoteStore::new(60, 2, 0);
    store.add(wave_quotes(0, count));

    let bounds_type = if close_only { BoundsType::Close } else { BoundsType::HighLow };
    let request = MetricsRequest {
        bounds_type,
        ..candle_request(width, f64::from(offset))
    };
    let metrics = MetricsY::compute(&store, &request);

    let range = metrics.range;
    let in_bounds = range.start <= range.end && range.end < count;
    let (high, low) = brute_bounds(&store.all()[range.start..=range.end], bounds_type);
    in_bounds && metrics.high == high && metrics.low == low && metrics.high >= metrics.low
}

#[test]
fn trimmed_store_and_narrow_viewport() {
    let mut store = QuoteStore::new(60, 2, 800);
    store.add(wave_quotes(0, 300));
    assert_eq!(store.count(), 300);

    store.add(wave_quotes(300, 600));
    assert_eq!(store.count(), 800);
    assert_eq!(store.first().map(|q| q.timestamp), Some(100.0 * 60.0));
    assert_eq!(store.last().map(|q| q.timestamp), Some(899.0 * 60.0));

    let width = 600.0;
    let metrics = MetricsY::compute(&store, &candle_request(width, 1200.0));
    assert_eq!(metrics.x_delta, 6.0);
    assert!(metrics.content_width() > width);
    assert_eq!(metrics.range.start, 200);
    assert_eq!(metrics.range.len(), (width / metrics.x_delta).ceil() as usize + 1);

    let (high, low) = brute_bounds(store.quotes(metrics.range), BoundsType::HighLow);
    assert_eq!((metrics.high, metrics.low), (high, low));
}

#[test]
fn few_candles_are_fitted_to_the_frame() {
    let mut store = QuoteStore::new(60, 2, 0);
    store.add(wave_quotes(0, 10));
    let metrics = MetricsY::compute(&store, &candle_request(300.0, 0.0));

    assert_eq!(metrics.x_delta, 20.0);
    assert_eq!(metrics.point_margin, 5.0);
    assert_eq!(metrics.point_width, 15.0);
    assert_eq!((metrics.range.start, metrics.range.end), (0, 9));
}

#[test]
fn line_metrics_span_the_whole_buffer() {
    let mut store = QuoteStore::new(60, 2, 0);
    store.add(wave_quotes(0, 200));
    let request = MetricsRequest {
        bounds_type: BoundsType::Close,
        ..MetricsRequest::new(Size::new(400.0, 300.0), 0.0)
    };
    let metrics = MetricsY::compute(&store, &request);

    assert_eq!(metrics.x_delta, 2.0);
    assert_eq!((metrics.range.start, metrics.range.end), (0, 199));
    assert_eq!(metrics.ref_price, store.first().unwrap().close);
    assert_eq!(metrics.last_close_price, store.last().unwrap().close);
}

#[test]
fn zoom_scales_point_width() {
    let mut store = QuoteStore::new(60, 2, 0);
    store.add(wave_quotes(0, 500));
    let plain = MetricsY::compute(&store, &candle_request(300.0, 0.0));
    let zoomed = MetricsY::compute(
        &store,
        &MetricsRequest {
            zoom: 2.0,
            ..candle_request(300.0, 0.0)
        },
    );
    assert_eq!(zoomed.point_width, plain.point_width * 2.0);
    assert!(zoomed.range.len() < plain.range.len());
}

#[test]
fn empty_store_yields_empty_metrics() {
    let store = QuoteStore::new(60, 2, 0);
    let metrics = MetricsY::compute(&store, &candle_request(300.0, 0.0));
    assert!(metrics.is_empty());
    assert!(metrics.index_at(10.0).is_none());
    assert!(price_ticks(&metrics).is_empty());
}

#[test]
fn price_ticks_are_round_and_inside() {
    let mut store = QuoteStore::new(60, 2, 0);
    store.add(wave_quotes(0, 50));
    let metrics = MetricsY::compute(&store, &candle_request(300.0, 0.0));
    let ticks = price_ticks(&metrics);

    assert!(!ticks.is_empty() && ticks.len() <= 6);
    let step = ticks.get(1).map(|t| t.value - ticks[0].value);
    for tick in &ticks {
        assert!(tick.value > metrics.low && tick.value < metrics.high);
        assert!(tick.y > 15.0 && tick.y < 285.0);
        if let Some(step) = step {
            assert!((tick.value / step - (tick.value / step).round()).abs() < 1e-6);
        }
    }
}
