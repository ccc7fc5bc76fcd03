//! Candlestick, bar and line renderers.
//!
//! All three share one redraw policy: nothing happens while the visible
//! range is unchanged, a bounds change or a forced pass rebuilds the whole
//! range, anything else only touches the indices that entered or left the
//! range. Detached primitives are parked in a bounded pool.

use std::collections::BTreeMap;

use hecs::Entity;
use serde::Serialize;

use super::pool::Pool;
use crate::domain::chart::{
    BoundsType, ChartSettings, ChartStyle, MetricsY, PriceDirection, RangeIndex, Rect,
};
use crate::domain::market_data::{Quote, QuoteStore};
use crate::ecs::Scene;
use crate::ecs::components::{LinePrimitive, PointGeometry, PointPrimitive};

/// Structural work done by one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RenderStats {
    /// Primitives allocated from scratch
    pub constructed: usize,
    /// Primitives taken back out of the pool
    pub reused: usize,
    /// Primitives detached into the pool
    pub recycled: usize,
    /// Pooled primitives dropped because the pool was full
    pub discarded: usize,
    /// Attached primitives whose geometry was rewritten in place
    pub updated: usize,
}

impl RenderStats {
    /// Attach and detach operations, in-place updates excluded.
    pub fn structural_ops(&self) -> usize {
        self.constructed + self.reused + self.recycled
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayerUpdate {
    pub stats: RenderStats,
    pub direction_changed: Option<PriceDirection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastQuoteUpdate {
    /// Only the last primitive was touched.
    Updated,
    /// The tick leaves the drawn bounds, a forced pass is required.
    NeedsRedraw,
    /// Last quote is not on screen.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LastQuoteOutcome {
    pub status: LastQuoteUpdate,
    pub direction_changed: Option<PriceDirection>,
}

impl LastQuoteOutcome {
    fn status(status: LastQuoteUpdate) -> Self {
        Self {
            status,
            direction_changed: None,
        }
    }
}

/// Reports a direction only when it differs from the previous one.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectionTracker {
    current: Option<PriceDirection>,
}

impl DirectionTracker {
    pub fn observe(&mut self, direction: PriceDirection) -> Option<PriceDirection> {
        if self.current == Some(direction) {
            return None;
        }
        self.current = Some(direction);
        Some(direction)
    }

    pub fn current(&self) -> Option<PriceDirection> {
        self.current
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DrawnState {
    range: RangeIndex,
    high: f64,
    low: f64,
}

impl DrawnState {
    fn of(metrics: &MetricsY) -> Self {
        Self {
            range: metrics.range,
            high: metrics.high,
            low: metrics.low,
        }
    }

    fn same_bounds(&self, other: &DrawnState) -> bool {
        self.high == other.high && self.low == other.low
    }

    fn encloses(&self, quote: &Quote, bounds_type: BoundsType) -> bool {
        let (high, low) = value_span(quote, bounds_type);
        high <= self.high && low >= self.low
    }
}

fn value_span(quote: &Quote, bounds_type: BoundsType) -> (f64, f64) {
    match bounds_type {
        BoundsType::Close => (quote.close, quote.close),
        BoundsType::HighLow => (quote.high, quote.low),
        BoundsType::Volume => (quote.volume, quote.volume),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointShape {
    Candle,
    Bar,
}

/// Candle or bar geometry for `quote`, in content pixels.
pub fn point_geometry(shape: PointShape, quote: &Quote, metrics: &MetricsY) -> PointGeometry {
    let left = metrics.x_pos(quote.index) + metrics.point_margin / 2.0;
    let width = metrics.point_width.max(1.0);
    let center = (left + width / 2.0).floor();
    let (y_high, y_low) = (metrics.y_pos(quote.high), metrics.y_pos(quote.low));
    let (y_open, y_close) = (metrics.y_pos(quote.open), metrics.y_pos(quote.close));
    let stem = Rect::new(center, y_high, 1.0, (y_low - y_high).max(1.0));

    match shape {
        PointShape::Candle => PointGeometry::Candle {
            body: Rect::new(
                left,
                y_open.min(y_close),
                width,
                (y_open - y_close).abs().max(1.0),
            ),
            wick: stem,
        },
        PointShape::Bar => PointGeometry::Bar {
            stem,
            open_tick: Rect::new(left, y_open, (center - left).max(0.0), 1.0),
            close_tick: Rect::new(center + 1.0, y_close, (left + width - center - 1.0).max(0.0), 1.0),
        },
    }
}

/// Shared recycling core of the candlestick and bar layers.
#[derive(Debug)]
pub struct PointSeriesLayer {
    shape: PointShape,
    bounds_type: BoundsType,
    attached: BTreeMap<usize, Entity>,
    pool: Pool<PointPrimitive>,
    drawn: Option<DrawnState>,
}

impl PointSeriesLayer {
    pub fn new(shape: PointShape, pool_capacity: usize) -> Self {
        Self {
            shape,
            bounds_type: BoundsType::HighLow,
            attached: BTreeMap::new(),
            pool: Pool::new(pool_capacity),
            drawn: None,
        }
    }

    pub fn update(
        &mut self,
        scene: &mut Scene,
        store: &QuoteStore,
        metrics: &MetricsY,
        settings: &ChartSettings,
        force: bool,
    ) -> LayerUpdate {
        if metrics.is_empty() {
            return LayerUpdate {
                stats: self.clear(scene),
                direction_changed: None,
            };
        }
        let target = DrawnState::of(metrics);
        let mut stats = RenderStats::default();

        let drawn = self.drawn;
        match drawn {
            Some(drawn) if !force && drawn.range == target.range => return LayerUpdate::default(),
            Some(drawn) if !force && drawn.same_bounds(&target) => {
                let leaving: Vec<usize> = self
                    .attached
                    .keys()
                    .copied()
                    .filter(|index| !target.range.contains(*index))
                    .collect();
                for index in leaving {
                    self.detach(scene, index, &mut stats);
                }
                for index in target.range.iter() {
                    if !self.attached.contains_key(&index) {
                        self.attach(scene, store, metrics, settings, index, &mut stats);
                    }
                }
            }
            _ => {
                let all: Vec<usize> = self.attached.keys().copied().collect();
                for index in all {
                    self.detach(scene, index, &mut stats);
                }
                for index in target.range.iter() {
                    self.attach(scene, store, metrics, settings, index, &mut stats);
                }
            }
        }

        self.drawn = Some(target);
        LayerUpdate {
            stats,
            direction_changed: None,
        }
    }

    pub fn update_last_quote(
        &mut self,
        scene: &mut Scene,
        store: &QuoteStore,
        metrics: &MetricsY,
        settings: &ChartSettings,
    ) -> LastQuoteOutcome {
        let (Some(drawn), Some(last)) = (self.drawn, store.last()) else {
            return LastQuoteOutcome::status(LastQuoteUpdate::Skipped);
        };
        if !drawn.range.contains(last.index) {
            return LastQuoteOutcome::status(LastQuoteUpdate::Skipped);
        }
        if !drawn.encloses(last, self.bounds_type) {
            return LastQuoteOutcome::status(LastQuoteUpdate::NeedsRedraw);
        }
        let Some(mut primitive) = self
            .attached
            .get(&last.index)
            .and_then(|entity| scene.point_mut(*entity))
        else {
            return LastQuoteOutcome::status(LastQuoteUpdate::NeedsRedraw);
        };
        self.shape_primitive(&mut primitive, last, metrics, settings);
        LastQuoteOutcome::status(LastQuoteUpdate::Updated)
    }

    pub fn clear(&mut self, scene: &mut Scene) -> RenderStats {
        let mut stats = RenderStats::default();
        let all: Vec<usize> = self.attached.keys().copied().collect();
        for index in all {
            self.detach(scene, index, &mut stats);
        }
        self.drawn = None;
        stats
    }

    pub fn attached_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.attached.keys().copied()
    }

    pub fn pooled(&self) -> usize {
        self.pool.len()
    }

    fn attach(
        &mut self,
        scene: &mut Scene,
        store: &QuoteStore,
        metrics: &MetricsY,
        settings: &ChartSettings,
        index: usize,
        stats: &mut RenderStats,
    ) {
        let Some(quote) = store.get(index) else {
            return;
        };
        let mut primitive = match self.pool.take() {
            Some(primitive) => {
                stats.reused += 1;
                primitive
            }
            None => {
                stats.constructed += 1;
                PointPrimitive::default()
            }
        };
        self.shape_primitive(&mut primitive, quote, metrics, settings);
        let entity = scene.attach_point(primitive);
        self.attached.insert(index, entity);
    }

    fn detach(&mut self, scene: &mut Scene, index: usize, stats: &mut RenderStats) {
        let Some(entity) = self.attached.remove(&index) else {
            return;
        };
        if let Some(primitive) = scene.detach_point(entity) {
            stats.recycled += 1;
            if self.pool.put(primitive) {
                stats.discarded += 1;
            }
        }
    }

    fn shape_primitive(
        &self,
        primitive: &mut PointPrimitive,
        quote: &Quote,
        metrics: &MetricsY,
        settings: &ChartSettings,
    ) {
        primitive.quote_index = quote.index;
        primitive.positive = quote.is_positive();
        primitive.geometry = point_geometry(self.shape, quote, metrics);
        primitive.fill = Some(settings.variation_color(primitive.positive));
        primitive.stroke = match self.shape {
            PointShape::Candle => Some(settings.candle_border_color),
            PointShape::Bar => None,
        };
    }
}

/// Single path over the visible closes plus a gradient fill.
#[derive(Debug, Default)]
pub struct LineLayer {
    entity: Option<Entity>,
    drawn: Option<DrawnState>,
    direction: DirectionTracker,
}

impl LineLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(
        &mut self,
        scene: &mut Scene,
        store: &QuoteStore,
        metrics: &MetricsY,
        settings: &ChartSettings,
        force: bool,
    ) -> LayerUpdate {
        if metrics.is_empty() {
            return LayerUpdate {
                stats: self.clear(scene),
                direction_changed: None,
            };
        }
        if let Some(drawn) = self.drawn {
            if !force && drawn.range == metrics.range {
                return LayerUpdate::default();
            }
        }

        let quotes = store.quotes(metrics.range);
        let (Some(first), Some(last)) = (quotes.first(), quotes.last()) else {
            return LayerUpdate::default();
        };
        let direction = PriceDirection::between(first.close, last.close);
        let direction_changed = self.direction.observe(direction);

        let mut primitive = LinePrimitive {
            points: quotes.iter().map(|q| metrics.point(q.close, q.index)).collect(),
            width: settings.line_width,
            baseline: metrics.frame_size.height,
            ..LinePrimitive::default()
        };
        Self::paint(&mut primitive, direction, settings);

        let mut stats = RenderStats::default();
        match self.entity.filter(|entity| scene.contains(*entity)) {
            Some(entity) => {
                if let Some(mut attached) = scene.line_mut(entity) {
                    *attached = primitive;
                }
                stats.updated += 1;
            }
            None => {
                self.entity = Some(scene.attach_line(primitive));
                stats.constructed += 1;
            }
        }
        self.drawn = Some(DrawnState::of(metrics));
        LayerUpdate {
            stats,
            direction_changed,
        }
    }

    pub fn update_last_quote(
        &mut self,
        scene: &mut Scene,
        store: &QuoteStore,
        metrics: &MetricsY,
        settings: &ChartSettings,
    ) -> LastQuoteOutcome {
        let (Some(drawn), Some(last)) = (self.drawn, store.last()) else {
            return LastQuoteOutcome::status(LastQuoteUpdate::Skipped);
        };
        if !drawn.range.contains(last.index) {
            return LastQuoteOutcome::status(LastQuoteUpdate::Skipped);
        }
        if !drawn.encloses(last, BoundsType::Close) {
            return LastQuoteOutcome::status(LastQuoteUpdate::NeedsRedraw);
        }
        let Some(mut line) = self.entity.and_then(|entity| scene.line_mut(entity)) else {
            return LastQuoteOutcome::status(LastQuoteUpdate::NeedsRedraw);
        };
        if let Some(point) = line.points.last_mut() {
            *point = metrics.point(last.close, last.index);
        }
        let first_close = store.get(drawn.range.start).map(|q| q.close).unwrap_or(last.close);
        let direction = PriceDirection::between(first_close, last.close);
        let direction_changed = self.direction.observe(direction);
        Self::paint(&mut line, direction, settings);

        LastQuoteOutcome {
            status: LastQuoteUpdate::Updated,
            direction_changed,
        }
    }

    pub fn clear(&mut self, scene: &mut Scene) -> RenderStats {
        let mut stats = RenderStats::default();
        if let Some(entity) = self.entity.take() {
            if scene.detach_line(entity).is_some() {
                stats.recycled += 1;
            }
        }
        self.drawn = None;
        stats
    }

    pub fn direction(&self) -> Option<PriceDirection> {
        self.direction.current()
    }

    fn paint(line: &mut LinePrimitive, direction: PriceDirection, settings: &ChartSettings) {
        let up = !settings.line_listen_to_price_direction || direction == PriceDirection::Up;
        line.stroke = Some(settings.variation_color(up));
        let top = settings.variation_light_color(up);
        line.gradient_top = Some(top);
        line.gradient_bottom = Some(top.with_alpha(0.0));
    }
}

/// Closed set of renderers, picked once per style.
#[derive(Debug)]
pub enum GraphLayer {
    Candlestick(PointSeriesLayer),
    Bar(PointSeriesLayer),
    Line(LineLayer),
}

impl GraphLayer {
    pub fn for_style(style: ChartStyle, settings: &ChartSettings) -> Option<Self> {
        let capacity = settings.primitive_pool_capacity;
        match style {
            ChartStyle::Candlestick => Some(GraphLayer::Candlestick(PointSeriesLayer::new(
                PointShape::Candle,
                capacity,
            ))),
            ChartStyle::Bar => Some(GraphLayer::Bar(PointSeriesLayer::new(PointShape::Bar, capacity))),
            ChartStyle::Line => Some(GraphLayer::Line(LineLayer::new())),
            ChartStyle::Undefined => None,
        }
    }

    pub fn style(&self) -> ChartStyle {
        match self {
            GraphLayer::Candlestick(_) => ChartStyle::Candlestick,
            GraphLayer::Bar(_) => ChartStyle::Bar,
            GraphLayer::Line(_) => ChartStyle::Line,
        }
    }

    pub fn update(
        &mut self,
        scene: &mut Scene,
        store: &QuoteStore,
        metrics: &MetricsY,
        settings: &ChartSettings,
        force: bool,
    ) -> LayerUpdate {
        match self {
            GraphLayer::Candlestick(layer) | GraphLayer::Bar(layer) => {
                layer.update(scene, store, metrics, settings, force)
            }
            GraphLayer::Line(layer) => layer.update(scene, store, metrics, settings, force),
        }
    }

    pub fn update_last_quote(
        &mut self,
        scene: &mut Scene,
        store: &QuoteStore,
        metrics: &MetricsY,
        settings: &ChartSettings,
    ) -> LastQuoteOutcome {
        match self {
            GraphLayer::Candlestick(layer) | GraphLayer::Bar(layer) => {
                layer.update_last_quote(scene, store, metrics, settings)
            }
            GraphLayer::Line(layer) => layer.update_last_quote(scene, store, metrics, settings),
        }
    }

    pub fn clear(&mut self, scene: &mut Scene) -> RenderStats {
        match self {
            GraphLayer::Candlestick(layer) | GraphLayer::Bar(layer) => layer.clear(scene),
            GraphLayer::Line(layer) => layer.clear(scene),
        }
    }

    pub fn drawn_range(&self) -> Option<RangeIndex> {
        let drawn = match self {
            GraphLayer::Candlestick(layer) | GraphLayer::Bar(layer) => layer.drawn,
            GraphLayer::Line(layer) => layer.drawn,
        };
        drawn.map(|d| d.range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::Size;

    #[test]
    fn candle_body_spans_open_close() {
        let metrics = MetricsY {
            high: 20.0,
            low: 0.0,
            x_delta: 10.0,
            point_width: 8.0,
            point_margin: 2.0,
            frame_size: Size::new(100.0, 200.0),
            count: 10,
            ..MetricsY::default()
        };
        let mut quote = Quote::new(0.0, 5.0, 15.0, 2.0, 10.0, 1.0);
        quote.index = 3;
        let PointGeometry::Candle { body, wick } = point_geometry(PointShape::Candle, &quote, &metrics) else {
            panic!("expected a candle");
        };
        assert_eq!(body, Rect::new(31.0, 100.0, 8.0, 50.0));
        assert_eq!(wick.y, 50.0);
        assert_eq!(wick.max_y(), 180.0);
    }

    #[test]
    fn direction_tracker_reports_flips_only() {
        let mut tracker = DirectionTracker::default();
        assert_eq!(tracker.observe(PriceDirection::Up), Some(PriceDirection::Up));
        assert_eq!(tracker.observe(PriceDirection::Up), None);
        assert_eq!(tracker.observe(PriceDirection::Down), Some(PriceDirection::Down));
    }
}
