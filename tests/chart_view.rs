use std::cell::RefCell;
use std::rc::Rc;

use coin_chart_wasm::application::ChartView;
use coin_chart_wasm::domain::chart::{
    ChartSettings, ChartStyle, Color, Point, PriceDirection, RangeIndex, Size, Variation,
};
use coin_chart_wasm::domain::events::ChartEvent;
use coin_chart_wasm::domain::market_data::{Quote, Symbol, UpdateOutcome};
use coin_chart_wasm::infrastructure::rendering::{GesturePhase, HLine, HLineStyle};

const START: f64 = 1_610_031_600.0;

fn rising(count: usize) -> Vec<Quote> {
    (0..count)
        .map(|i| {
            let p = 100.0 + i as f64 * 0.1;
            Quote::new(START + i as f64 * 60.0, p, p + 1.0, p - 1.0, p + 0.05, 1.0)
        })
        .collect()
}

fn chart(style: ChartStyle) -> ChartView {
    ChartView::with_style(ChartSettings::default(), Size::new(300.0, 200.0), style).unwrap()
}

fn record(view: &mut ChartView) -> Rc<RefCell<Vec<ChartEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    view.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    events
}

#[test]
fn first_load_scrolls_to_the_latest_quote() {
    let mut view = chart(ChartStyle::Candlestick);
    let outcome = view.add_quotes(rising(300));

    assert!(outcome.first_load);
    assert_eq!(view.metrics_y().x_delta, 6.0);
    assert_eq!(view.scroll().offset(), 1500.0);
    assert_eq!(view.metrics_y().range, RangeIndex::new(250, 299));
    assert!(view.is_last_point_visible());
    assert_eq!(view.scene().point_count(), 50);
}

#[test]
fn new_quotes_follow_only_when_the_tail_was_visible() {
    let mut view = chart(ChartStyle::Candlestick);
    view.add_quotes(rising(300));
    view.add_quotes(rising(301).into_iter().skip(300));
    assert_eq!(view.scroll().offset(), 1506.0);

    view.scroll_to_first();
    assert_eq!(view.metrics_y().range.start, 0);
    view.add_quotes(rising(302).into_iter().skip(301));
    assert_eq!(view.scroll().offset(), 0.0);
    assert!(!view.is_last_point_visible());

    view.scroll_to_last();
    assert!(view.is_last_point_visible());
}

#[test]
fn pure_scroll_inside_a_slot_does_no_structural_work() {
    let mut view = chart(ChartStyle::Candlestick);
    view.add_quotes(rising(300));
    view.scroll_to(600.0);
    let range = view.metrics_y().range;

    view.scroll_by(2.0);
    assert_eq!(view.metrics_y().range, range);
    assert_eq!(view.last_render_stats().structural_ops(), 0);
}

#[test]
fn clamped_offset_is_replayed_as_one_trailing_pass() {
    let mut view = chart(ChartStyle::Candlestick);
    view.add_quotes(rising(300));
    assert_eq!(view.scroll().offset(), 1500.0);
    let passes = view.refresh_passes();

    // fitting every point shrinks the content to the viewport
    let settings = ChartSettings {
        display_all_points: true,
        ..ChartSettings::default()
    };
    view.set_settings(settings).unwrap();

    assert_eq!(view.coalesced_refreshes(), 1);
    assert_eq!(view.refresh_passes(), passes + 2);
    assert_eq!(view.scroll().offset(), 0.0);
    assert_eq!(view.metrics_y().range, RangeIndex::new(0, 299));
}

#[test]
fn streaming_ticks_merge_into_the_last_quote() {
    let mut view = chart(ChartStyle::Candlestick);
    view.add_quotes(rising(100));
    let last = *view.store().last().unwrap();

    assert!(!view.update_last_price(0.0));
    assert!(!view.update_last_price(-3.0));
    assert!(!view.update_last_price(last.close));

    assert!(view.update_last_price(last.close + 0.5));
    let merged = *view.store().last().unwrap();
    assert_eq!(view.store().count(), 100);
    assert_eq!(merged.close, last.close + 0.5);
    assert_eq!(merged.high, last.high.max(last.close + 0.5));
    let current = view.value_axis().current().expect("current price label");
    assert_eq!(current.variation, Variation::Positive);
    assert_eq!(current.label.background, Some(ChartSettings::default().positive));

    assert!(view.update_last_price(last.close - 0.5));
    let current = view.value_axis().current().expect("current price label");
    assert_eq!(current.variation, Variation::Negative);
}

#[test]
fn tick_beyond_the_bounds_forces_a_redraw() {
    let mut view = chart(ChartStyle::Candlestick);
    view.add_quotes(rising(100));
    let high = view.metrics_y().high;

    view.update_last_price(high + 10.0);
    assert_eq!(view.metrics_y().high, high + 10.0);
    assert_eq!(view.metrics_y().last_close_price, high + 10.0);
}

#[test]
fn newer_quote_is_appended() {
    let mut view = chart(ChartStyle::Bar);
    view.add_quotes(rising(10));
    let outcome = view.update_last(Quote::from_price(START + 600.0, 105.0));
    assert!(matches!(outcome, UpdateOutcome::Appended(_)));
    assert_eq!(view.store().count(), 11);
    assert_eq!(view.metrics_y().range.end, 10);
}

#[test]
fn style_change_swaps_the_layer_and_notifies() {
    let mut view = chart(ChartStyle::Undefined);
    let events = record(&mut view);
    view.add_quotes(rising(120));
    assert!(view.layer().is_none());
    assert!(view.scene().is_empty());

    view.change_style(ChartStyle::Line);
    assert_eq!(view.style(), ChartStyle::Line);
    assert_eq!(view.scene().line_count(), 1);
    assert_eq!(view.metrics_y().range, RangeIndex::new(0, 119));

    view.change_style(ChartStyle::Candlestick);
    assert_eq!(view.scene().line_count(), 0);
    assert_eq!(view.scene().point_count(), 50);

    let events = events.borrow();
    assert_eq!(
        *events,
        vec![
            ChartEvent::StyleChanged(ChartStyle::Line),
            ChartEvent::PriceDirectionChanged(PriceDirection::Up),
            ChartEvent::StyleChanged(ChartStyle::Candlestick),
        ]
    );
}

#[test]
fn line_direction_flips_on_a_falling_tick() {
    let mut view = chart(ChartStyle::Line);
    let events = record(&mut view);
    view.add_quotes(rising(50));

    view.update_last_price(50.0);
    let events = events.borrow();
    assert_eq!(
        events.as_slice(),
        [
            ChartEvent::PriceDirectionChanged(PriceDirection::Up),
            ChartEvent::PriceDirectionChanged(PriceDirection::Down),
        ]
    );
}

#[test]
fn selection_follows_the_gesture() {
    let mut view = chart(ChartStyle::Candlestick);
    let events = record(&mut view);
    view.add_quotes(rising(300));

    let selected = view.handle_selection(GesturePhase::Began, Point::new(47.0, 80.0));
    assert_eq!(selected.map(|q| q.index), Some(257));
    assert_eq!(view.quote_at(47.0).map(|q| q.index), Some(257));

    assert!(view.handle_selection(GesturePhase::Ended, Point::new(47.0, 80.0)).is_none());
    assert!(!view.selection().is_visible());

    let events = events.borrow();
    assert!(matches!(events[0], ChartEvent::SelectedQuote(q) if q.index == 257));
    assert_eq!(events[1], ChartEvent::SelectionCleared);
}

#[test]
fn reference_lines_drive_the_scale_button() {
    let mut view = chart(ChartStyle::Candlestick);
    let events = record(&mut view);
    view.add_quotes(rising(300));
    let natural_high = view.metrics_y().high;

    view.add_hline(HLine::new("alert", natural_high + 20.0, HLineStyle::Dotted, Color::WHITE, None));
    assert!(view.is_scale_button_visible());
    assert!(view.hlines().placed().is_empty());

    assert!(view.toggle_vertical_scale());
    assert!(view.metrics_y().high > natural_high + 20.0);
    assert_eq!(view.hlines().placed().len(), 1);

    assert_eq!(view.remove_hline("alert"), 1);
    assert!(!view.is_scale_button_visible());
    assert_eq!(view.metrics_y().high, natural_high);

    let events = events.borrow();
    assert_eq!(
        *events,
        vec![
            ChartEvent::VerticalScaleButtonVisibility(true),
            ChartEvent::VerticalScaleButtonVisibility(false),
        ]
    );
}

#[test]
fn anchored_zoom_keeps_the_quote_under_the_pointer() {
    let mut view = chart(ChartStyle::Candlestick);
    view.add_quotes(rising(600));
    view.scroll_to(1200.0);
    let before = view.quote_at(150.0).map(|q| q.index);

    assert!(view.zoom_at(2.0, 150.0));
    assert_eq!(view.scroll().scale(), 2.0);
    assert_eq!(view.metrics_y().point_width, 10.0);
    assert_eq!(view.quote_at(150.0).map(|q| q.index), before);

    // clamped back to the minimum scale
    assert!(view.zoom_at(0.1, 150.0));
    assert_eq!(view.scroll().scale(), 1.0);
    assert!(!view.zoom_at(0.5, 150.0));

    view.reset_zoom();
    assert_eq!(view.scroll().scale(), 1.0);
    assert_eq!(view.metrics_y().x_delta, 6.0);
}

#[test]
fn new_symbol_starts_from_scratch() {
    let mut view = chart(ChartStyle::Candlestick);
    view.add_quotes(rising(300));
    view.set_symbol(Symbol::new("ETH-USD").unwrap());

    assert!(view.store().is_empty());
    assert!(view.metrics_y().is_empty());
    assert!(view.scene().is_empty());
    assert_eq!(view.scroll().offset(), 0.0);
    assert!(view.vertices().is_empty());
}

#[test]
fn axes_and_grid_follow_the_metrics() {
    let mut view = chart(ChartStyle::Candlestick);
    view.add_quotes(rising(300));

    let ticks = view.price_ticks().len();
    assert!(ticks > 0);
    assert_eq!(view.value_axis().labels().len(), ticks);
    assert_eq!(view.percent_axis().labels().len(), ticks);
    assert_eq!(view.grid().horizontal().len(), ticks);
    assert!(view.metrics_x().is_some_and(|plan| plan.covers(view.metrics_y().range)));
    assert!(!view.x_axis().is_empty());
    assert!(!view.vertices().is_empty());
}

#[test]
fn invalid_settings_are_rejected() {
    let settings = ChartSettings {
        primitive_pool_capacity: 0,
        ..ChartSettings::default()
    };
    assert!(ChartView::new(settings.clone(), Size::new(10.0, 10.0)).is_err());

    let mut view = chart(ChartStyle::Bar);
    assert!(view.set_settings(settings).is_err());
    assert_eq!(view.settings().primitive_pool_capacity, 5);
}
