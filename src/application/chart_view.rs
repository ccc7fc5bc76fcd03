use crate::application::refresh_gate::RefreshGate;
use crate::domain::chart::{
    ChartSettings, ChartStyle, MetricsRequest, MetricsX, MetricsY, NumberFormat, Point, PriceTick, Size,
    Variation, price_ticks,
};
use crate::domain::errors::AppResult;
use crate::domain::events::{ChartEvent, Listeners, SubscriptionId};
use crate::domain::logging::LogComponent;
use crate::domain::market_data::{AddOutcome, Quote, QuoteStore, Symbol, UpdateOutcome};
use crate::ecs::Scene;
use crate::ecs::systems::collect_vertices;
use crate::infrastructure::rendering::{
    ChartVertex, GesturePhase, GraphLayer, Grid, HLine, HLineSet, LastQuoteUpdate, NdcMapper, RenderStats,
    SelectionOverlay, XAxis, YAxis, YAxisMode,
};
use crate::view_state::ScrollState;
use crate::{log_debug, log_info};

/// Price moves smaller than this are not worth a redraw.
const PRICE_EPSILON: f64 = 1e-6;

/// One chart: owns the quote store, the scroll/zoom state and every
/// renderer, and keeps them in sync on data, scroll and zoom events.
///
/// Single threaded. Hosts marshal fetch completions onto the owning
/// thread before calling [`ChartView::add_quotes`] or
/// [`ChartView::update_last`].
pub struct ChartView {
    store: QuoteStore,
    settings: ChartSettings,
    style: ChartStyle,
    size: Size,
    scroll: ScrollState,
    format: NumberFormat,

    scene: Scene,
    layer: Option<GraphLayer>,
    hlines: HLineSet,
    x_axis: XAxis,
    percent_axis: YAxis,
    value_axis: YAxis,
    grid: Grid,
    selection: SelectionOverlay,

    metrics_y: MetricsY,
    metrics_x: Option<MetricsX>,
    price_ticks: Vec<PriceTick>,
    last_stats: RenderStats,
    scale_button_visible: bool,

    events: Listeners<ChartEvent>,
    gate: RefreshGate,
    passes: usize,
}

impl ChartView {
    pub fn new(settings: ChartSettings, size: Size) -> AppResult<Self> {
        settings.validate()?;
        let format = NumberFormat::new(2, settings.grouping);
        Ok(Self {
            store: QuoteStore::new(60, format.decimals, settings.max_points_count),
            style: ChartStyle::Undefined,
            size,
            scroll: ScrollState::new(size.width),
            format,
            scene: Scene::new(),
            layer: None,
            hlines: HLineSet::new(),
            x_axis: XAxis::new(),
            percent_axis: YAxis::new(YAxisMode::Percent, format),
            value_axis: YAxis::new(YAxisMode::Value, format),
            grid: Grid::new(),
            selection: SelectionOverlay::new(),
            metrics_y: MetricsY::empty(size, 0.0),
            metrics_x: None,
            price_ticks: Vec::new(),
            last_stats: RenderStats::default(),
            scale_button_visible: false,
            events: Listeners::new(),
            gate: RefreshGate::new(),
            passes: 0,
            settings,
        })
    }

    pub fn with_style(settings: ChartSettings, size: Size, style: ChartStyle) -> AppResult<Self> {
        let mut view = Self::new(settings, size)?;
        view.change_style(style);
        Ok(view)
    }

    // --- data ---

    /// Merges a batch and redraws. Scrolls to the newest quote on the
    /// first load, or when the newest quote was on screen before.
    pub fn add_quotes<I>(&mut self, quotes: I) -> AddOutcome
    where
        I: IntoIterator<Item = Quote>,
    {
        let follow = self.scroll.is_last_point_visible();
        let outcome = self.store.add(quotes);
        if outcome.added > 0 {
            self.quotes_changed(outcome, follow);
        }
        outcome
    }

    pub fn update_last(&mut self, quote: Quote) -> UpdateOutcome {
        let follow = self.scroll.is_last_point_visible();
        let outcome = self.store.update_last(quote);
        match outcome {
            UpdateOutcome::Appended(added) => self.quotes_changed(added, follow),
            UpdateOutcome::Merged(merged) => self.apply_merged_tick(merged),
        }
        outcome
    }

    /// Streaming single-price tick. Returns `false` when ignored.
    pub fn update_last_price(&mut self, price: f64) -> bool {
        if !price.is_finite() || price <= 0.0 {
            return false;
        }
        let Some(last) = self.store.last().copied() else {
            return false;
        };
        if (price - last.close).abs() < PRICE_EPSILON {
            return false;
        }

        let variation = Variation::between(last.close, price);
        self.percent_axis.set_variation(variation);
        self.value_axis.set_variation(variation);
        self.update_last(Quote {
            high: last.high.max(price),
            low: last.low.min(price),
            close: price,
            ..last
        });
        true
    }

    fn quotes_changed(&mut self, outcome: AddOutcome, follow: bool) {
        if outcome.first_load {
            log_info!(
                LogComponent::Application("ChartView"),
                "first load: {} quotes",
                self.store.count()
            );
        }
        self.refresh(true);
        if outcome.first_load || follow {
            self.scroll_to_last();
        }
    }

    fn apply_merged_tick(&mut self, merged: Quote) {
        self.metrics_y.last_close_price = merged.close;
        let status = match self.layer.as_mut() {
            Some(layer) => {
                let outcome = layer.update_last_quote(&mut self.scene, &self.store, &self.metrics_y, &self.settings);
                if let Some(direction) = outcome.direction_changed {
                    self.events.publish(&ChartEvent::PriceDirectionChanged(direction));
                }
                outcome.status
            }
            None => LastQuoteUpdate::Skipped,
        };

        if status == LastQuoteUpdate::NeedsRedraw {
            self.refresh(true);
        } else {
            self.percent_axis.refresh_current(&self.metrics_y, &self.settings);
            self.value_axis.refresh_current(&self.metrics_y, &self.settings);
        }
    }

    /// A new symbol is a new series: buffer, scroll and zoom are reset.
    pub fn set_symbol(&mut self, symbol: Symbol) {
        if self.store.symbol() == Some(&symbol) {
            return;
        }
        self.store.set_symbol(symbol);
        self.reset_after_clear();
    }

    pub fn set_interval(&mut self, seconds: u32) {
        if self.store.interval() == seconds {
            return;
        }
        self.store.set_interval(seconds);
        self.reset_after_clear();
    }

    pub fn set_decimals(&mut self, decimals: u32) {
        self.store.set_decimals(decimals);
        self.format.decimals = decimals;
        self.percent_axis.set_format(self.format);
        self.value_axis.set_format(self.format);
        self.refresh(true);
    }

    pub fn set_settings(&mut self, settings: ChartSettings) -> AppResult<()> {
        settings.validate()?;
        let rebuild_layer = settings.primitive_pool_capacity != self.settings.primitive_pool_capacity;
        self.store.set_max_count(settings.max_points_count);
        self.format.grouping = settings.grouping;
        self.percent_axis.set_format(self.format);
        self.value_axis.set_format(self.format);
        self.settings = settings;
        if rebuild_layer {
            if let Some(mut layer) = self.layer.take() {
                layer.clear(&mut self.scene);
            }
            self.layer = GraphLayer::for_style(self.style, &self.settings);
        }
        self.refresh(true);
        Ok(())
    }

    fn reset_after_clear(&mut self) {
        self.selection.hide();
        self.scroll.reset();
        self.metrics_x = None;
        self.refresh(true);
    }

    // --- style ---

    pub fn style(&self) -> ChartStyle {
        self.style
    }

    /// Swaps the renderer and redraws from scratch.
    pub fn change_style(&mut self, style: ChartStyle) {
        if style == self.style {
            return;
        }
        if let Some(mut layer) = self.layer.take() {
            layer.clear(&mut self.scene);
        }
        self.style = style;
        self.layer = GraphLayer::for_style(style, &self.settings);
        self.selection.hide();
        log_info!(
            LogComponent::Application("ChartView"),
            "style changed to {}",
            style
        );
        self.events.publish(&ChartEvent::StyleChanged(style));

        self.scroll.reset();
        self.refresh(true);
        self.scroll_to_last();
    }

    // --- geometry, scroll and zoom ---

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
        self.scroll.set_viewport_width(size.width);
        self.refresh(true);
    }

    pub fn scroll_to(&mut self, offset: f64) {
        if self.scroll.scroll_to(offset) {
            self.on_scroll();
        }
    }

    pub fn scroll_by(&mut self, delta: f64) {
        self.scroll_to(self.scroll.offset() + delta);
    }

    pub fn scroll_to_first(&mut self) {
        if self.scroll.scroll_to_first() {
            self.on_scroll();
        }
    }

    pub fn scroll_to_last(&mut self) {
        if self.scroll.scroll_to_last() {
            self.on_scroll();
        }
    }

    pub fn is_last_point_visible(&self) -> bool {
        self.scroll.is_last_point_visible()
    }

    pub fn reset_zoom(&mut self) {
        self.scroll.reset();
        self.refresh(true);
    }

    /// Sets an absolute scale around the middle of the viewport.
    pub fn zoom(&mut self, scale: f64) -> bool {
        let factor = scale / self.scroll.scale();
        self.zoom_at(factor, self.size.width / 2.0)
    }

    /// Scales by `factor` keeping the quote under `anchor_x` in place.
    pub fn zoom_at(&mut self, factor: f64, anchor_x: f64) -> bool {
        let Some(anchor) = self.scroll.zoom_at(factor, anchor_x, self.metrics_y.x_delta) else {
            return false;
        };
        let preview = MetricsY::compute(&self.store, &self.metrics_request());
        self.scroll
            .apply_anchor(anchor, preview.x_delta, preview.content_width());
        self.refresh(true);
        true
    }

    fn on_scroll(&mut self) {
        self.refresh(false);
    }

    // --- refresh ---

    /// Recomputes metrics and pushes them to every renderer. Requests made
    /// while a pass runs are folded into one trailing pass.
    pub fn refresh(&mut self, force: bool) {
        if !self.gate.enter(force) {
            return;
        }
        let mut force = force;
        loop {
            self.refresh_pass(force);
            match self.gate.exit() {
                Some(next) => force = next,
                None => break,
            }
        }
    }

    fn metrics_request(&self) -> MetricsRequest {
        let fixed = self.style.has_fixed_point_width() && !self.settings.display_all_points;
        MetricsRequest {
            frame_size: self.size,
            frame_offset: self.scroll.offset(),
            bounds_type: self.style.bounds_type(),
            min_point_width: fixed.then_some(self.settings.candle_min_point_width),
            min_point_margin: self.settings.min_point_margin,
            zoom: self.scroll.scale(),
            extend_range_by: 0,
        }
    }

    fn refresh_pass(&mut self, force: bool) {
        self.passes += 1;
        let mut metrics = MetricsY::compute(&self.store, &self.metrics_request());

        if self.scroll.set_content_width(metrics.content_width()) {
            log_debug!(
                LogComponent::Application("ChartView"),
                "offset clamped to {}",
                self.scroll.offset()
            );
            self.on_scroll();
        }

        let outside = self.hlines.has_line_outside(&metrics);
        if outside != self.scale_button_visible {
            self.scale_button_visible = outside;
            self.events
                .publish(&ChartEvent::VerticalScaleButtonVisibility(outside));
        }
        self.hlines.adjust_bounds(&mut metrics);

        let stale_plan = force
            || self
                .metrics_x
                .as_ref()
                .is_none_or(|plan| !plan.covers(metrics.range));
        if stale_plan {
            self.metrics_x = Some(MetricsX::plan(
                &self.store,
                &metrics,
                self.settings.utc_offset_seconds,
            ));
        }
        self.price_ticks = price_ticks(&metrics);

        self.last_stats = RenderStats::default();
        if let Some(layer) = self.layer.as_mut() {
            let update = layer.update(&mut self.scene, &self.store, &metrics, &self.settings, force);
            self.last_stats = update.stats;
            if let Some(direction) = update.direction_changed {
                self.events.publish(&ChartEvent::PriceDirectionChanged(direction));
            }
        }

        match &self.metrics_x {
            Some(plan) => {
                self.x_axis.update(plan, &metrics, &self.settings);
            }
            None => self.x_axis.clear(),
        }
        self.percent_axis
            .update(&self.price_ticks, &metrics, &self.settings);
        self.value_axis
            .update(&self.price_ticks, &metrics, &self.settings);
        self.grid
            .update(&self.price_ticks, self.metrics_x.as_ref(), &metrics);
        self.hlines.layout(&metrics);
        self.metrics_y = metrics;
    }

    // --- selection ---

    /// Quote under a viewport-local x, if visible.
    pub fn quote_at(&self, x: f64) -> Option<Quote> {
        self.metrics_y
            .index_at(x)
            .and_then(|index| self.store.get(index))
            .copied()
    }

    /// One step of a long-press gesture at a viewport-local point.
    pub fn handle_selection(&mut self, phase: GesturePhase, point: Point) -> Option<Quote> {
        let was_visible = self.selection.is_visible();
        let selected = self.selection.handle(
            phase,
            point,
            &self.store,
            &self.metrics_y,
            self.style,
            &self.settings,
            self.format,
        );
        match selected {
            Some(quote) => self.events.publish(&ChartEvent::SelectedQuote(quote)),
            None if was_visible => self.events.publish(&ChartEvent::SelectionCleared),
            None => {}
        }
        selected
    }

    // --- horizontal lines ---

    pub fn add_hline(&mut self, line: HLine) {
        self.hlines.add(line);
        self.refresh(true);
    }

    pub fn remove_hline(&mut self, id: &str) -> usize {
        let removed = self.hlines.remove(id);
        if removed > 0 {
            self.refresh(true);
        }
        removed
    }

    pub fn remove_hlines(&mut self) {
        self.hlines.clear();
        self.refresh(true);
    }

    /// Flips "adjust vertical scale" mode, returns the new state.
    pub fn toggle_vertical_scale(&mut self) -> bool {
        let adjust = !self.hlines.adjust_vertical_scale();
        self.hlines.set_adjust_vertical_scale(adjust);
        self.refresh(true);
        adjust
    }

    // --- events ---

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&ChartEvent) + 'static,
    {
        self.events.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // --- output ---

    /// Whole frame as triangles: grid, series, reference lines, selection.
    pub fn vertices(&self) -> Vec<ChartVertex> {
        let content = NdcMapper::new(&self.metrics_y);
        let viewport = NdcMapper::viewport(self.size.width, self.size.height);
        let mut vertices = self.grid.vertices(&content, &self.settings);
        vertices.extend(collect_vertices(self.scene.world(), &self.metrics_y, &self.settings));
        vertices.extend(self.hlines.vertices(&viewport, self.size.width));
        vertices.extend(self.selection.vertices(&viewport, &self.settings));
        vertices
    }

    pub fn store(&self) -> &QuoteStore {
        &self.store
    }

    pub fn settings(&self) -> &ChartSettings {
        &self.settings
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn scroll(&self) -> &ScrollState {
        &self.scroll
    }

    pub fn metrics_y(&self) -> &MetricsY {
        &self.metrics_y
    }

    pub fn metrics_x(&self) -> Option<&MetricsX> {
        self.metrics_x.as_ref()
    }

    pub fn price_ticks(&self) -> &[PriceTick] {
        &self.price_ticks
    }

    pub fn layer(&self) -> Option<&GraphLayer> {
        self.layer.as_ref()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn hlines(&self) -> &HLineSet {
        &self.hlines
    }

    pub fn x_axis(&self) -> &XAxis {
        &self.x_axis
    }

    pub fn percent_axis(&self) -> &YAxis {
        &self.percent_axis
    }

    pub fn value_axis(&self) -> &YAxis {
        &self.value_axis
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn selection(&self) -> &SelectionOverlay {
        &self.selection
    }

    /// Structural work of the latest pass.
    pub fn last_render_stats(&self) -> RenderStats {
        self.last_stats
    }

    pub fn is_scale_button_visible(&self) -> bool {
        self.scale_button_visible
    }

    /// Refresh passes run so far.
    pub fn refresh_passes(&self) -> usize {
        self.passes
    }

    pub fn coalesced_refreshes(&self) -> usize {
        self.gate.coalesced()
    }
}

impl std::fmt::Debug for ChartView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartView")
            .field("style", &self.style)
            .field("size", &self.size)
            .field("quotes", &self.store.count())
            .field("range", &self.metrics_y.range)
            .finish()
    }
}
