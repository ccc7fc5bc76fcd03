use super::value_objects::{BoundsType, Point, RangeIndex, Rect, Size};
use crate::domain::market_data::QuoteStore;
use serde::Serialize;

/// Auto-fit candles never grow wider than this.
pub const MAX_FIT_POINT_WIDTH: f64 = 20.0;
/// Upper bound on price graduations per frame.
pub const MAX_GRADUATIONS: f64 = 5.0;
/// Graduations closer than this share of the height to an edge are dropped.
pub const GRADUATION_EDGE_MARGIN: f64 = 0.05;

const GRADUATION_LADDER: [f64; 24] = [
    0.0001, 0.00025, 0.0005, 0.00075, 0.001, 0.0025, 0.005, 0.0075, 0.01, 0.1, 0.25, 0.5, 1.0, 2.0,
    5.0, 10.0, 15.0, 20.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0,
];

/// Inputs of one Y metrics pass.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRequest {
    pub frame_size: Size,
    /// Horizontal scroll offset in content pixels
    pub frame_offset: f64,
    pub bounds_type: BoundsType,
    /// `Some` for styles that keep a minimum point width (candles, bars).
    pub min_point_width: Option<f64>,
    pub min_point_margin: f64,
    pub zoom: f64,
    /// Extra quotes kept on both sides of the visible range.
    pub extend_range_by: usize,
}

impl MetricsRequest {
    pub fn new(frame_size: Size, frame_offset: f64) -> Self {
        Self {
            frame_size,
            frame_offset,
            bounds_type: BoundsType::HighLow,
            min_point_width: None,
            min_point_margin: 0.0,
            zoom: 1.0,
            extend_range_by: 0,
        }
    }
}

/// Visible range, price bounds and pixel geometry of one refresh.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MetricsY {
    pub high: f64,
    pub low: f64,
    pub ref_price: f64,
    pub last_close_price: f64,
    pub x_delta: f64,
    pub point_width: f64,
    pub point_margin: f64,
    pub range: RangeIndex,
    pub frame_size: Size,
    pub frame_offset: f64,
    pub count: usize,
}

impl MetricsY {
    /// Nothing to draw. Renderers treat this as a clear.
    pub fn empty(frame_size: Size, frame_offset: f64) -> Self {
        Self {
            frame_size,
            frame_offset,
            ..Self::default()
        }
    }

    /// Computes the visible range and bounds for `request` over `store`.
    pub fn compute(store: &QuoteStore, request: &MetricsRequest) -> Self {
        let count = store.count();
        let width = request.frame_size.width;
        if count == 0 || width <= 0.0 {
            return Self::empty(request.frame_size, request.frame_offset);
        }
        let zoom = if request.zoom.is_finite() && request.zoom > 0.0 {
            request.zoom
        } else {
            1.0
        };

        let (point_width, point_margin) = match request.min_point_width {
            Some(min_width) => {
                let min_width = min_width * zoom;
                let margin = request.min_point_margin;
                let fitting = (width / (min_width + margin)).floor();
                if fitting > count as f64 {
                    let fit = MAX_FIT_POINT_WIDTH.min((width / count as f64).floor());
                    let fit_margin = (fit / 4.0).floor().max(1.0);
                    ((fit - fit_margin).max(0.0), fit_margin)
                } else {
                    (min_width, margin)
                }
            }
            None => (width * zoom / count as f64, 0.0),
        };
        let x_delta = point_width + point_margin;
        if !(x_delta.is_finite() && x_delta > 0.0) {
            return Self::empty(request.frame_size, request.frame_offset);
        }

        let last = count - 1;
        let mut start = if request.frame_offset <= 0.0 {
            0
        } else {
            ((request.frame_offset / x_delta).floor() as usize).min(last)
        };
        let mut end = (start + (width / x_delta).ceil() as usize).min(last);
        start = start.saturating_sub(request.extend_range_by);
        end = (end + request.extend_range_by).min(last);
        if start >= end && end > 0 {
            start = end - 1;
        }
        let range = RangeIndex::new(start, end);

        let (high, low) = bounds(store, range, request.bounds_type);
        let ref_price = store.first().map(|q| q.close).unwrap_or_default();
        let last_close_price = store.last().map(|q| q.close).unwrap_or_default();

        Self {
            high,
            low,
            ref_price,
            last_close_price,
            x_delta,
            point_width,
            point_margin,
            range,
            frame_size: request.frame_size,
            frame_offset: request.frame_offset,
            count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn content_width(&self) -> f64 {
        self.x_delta * self.count as f64
    }

    /// Price to pixel, `y` grows downwards.
    pub fn y_pos(&self, price: f64) -> f64 {
        let height = self.frame_size.height;
        let span = self.high - self.low;
        if span <= f64::EPSILON {
            return (height / 2.0).round();
        }
        (height - (price - self.low) * height / span).round()
    }

    pub fn price_at(&self, y: f64) -> f64 {
        let height = self.frame_size.height;
        if height <= 0.0 {
            return self.low;
        }
        self.low + (height - y) * (self.high - self.low) / height
    }

    /// Left edge of the slot of `index`, in content pixels.
    pub fn x_pos(&self, index: usize) -> f64 {
        index as f64 * self.x_delta
    }

    pub fn point(&self, price: f64, index: usize) -> Point {
        Point::new(self.x_pos(index), self.y_pos(price))
    }

    /// Visible window in content pixels.
    pub fn visible_frame(&self) -> Rect {
        Rect::new(
            self.frame_offset,
            0.0,
            self.frame_size.width,
            self.frame_size.height,
        )
    }

    /// Quote index under a viewport-local x, if it lies in the visible range.
    pub fn index_at(&self, x: f64) -> Option<usize> {
        if self.is_empty() || self.x_delta <= 0.0 {
            return None;
        }
        let absolute = x + self.frame_offset;
        if absolute < 0.0 {
            return None;
        }
        let index = (absolute / self.x_delta).floor() as usize;
        self.range.contains(index).then_some(index)
    }

    /// Fraction of change against the reference price.
    pub fn percent(&self, price: f64) -> f64 {
        if self.ref_price.abs() <= f64::EPSILON {
            return 0.0;
        }
        (price - self.ref_price) / self.ref_price
    }

    pub fn contains_price(&self, price: f64) -> bool {
        price >= self.low && price <= self.high
    }
}

fn bounds(store: &QuoteStore, range: RangeIndex, bounds_type: BoundsType) -> (f64, f64) {
    let visible = store.quotes(range);
    let (mut high, mut low) = (f64::MIN, f64::MAX);
    for quote in visible {
        let (h, l) = match bounds_type {
            BoundsType::Close => (quote.close, quote.close),
            BoundsType::HighLow => (quote.high, quote.low),
            BoundsType::Volume => (quote.volume, quote.volume),
        };
        high = high.max(h);
        low = low.min(l);
    }
    if visible.is_empty() { (0.0, 0.0) } else { (high, low) }
}

/// One horizontal graduation of the price axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceTick {
    pub value: f64,
    /// Fraction against the reference price
    pub percent: f64,
    pub y: f64,
}

/// First "round" step that yields at most [`MAX_GRADUATIONS`] lines.
pub fn graduation_step(y_delta: f64) -> Option<f64> {
    if !y_delta.is_finite() || y_delta <= 0.0 {
        return None;
    }
    if let Some(step) = GRADUATION_LADDER
        .iter()
        .copied()
        .find(|step| (y_delta / step).floor() <= MAX_GRADUATIONS)
    {
        return Some(step);
    }
    // past the ladder: 2500, 5000, 10000, 25000, ...
    let mut decade = 1000.0;
    loop {
        for factor in [2.5, 5.0, 10.0] {
            let step = decade * factor;
            if (y_delta / step).floor() <= MAX_GRADUATIONS {
                return Some(step);
            }
        }
        decade *= 10.0;
    }
}

/// Graduations strictly inside the frame, edges excluded.
pub fn price_ticks(metrics: &MetricsY) -> Vec<PriceTick> {
    if metrics.is_empty() || metrics.high <= metrics.low {
        return Vec::new();
    }
    let Some(step) = graduation_step(metrics.high - metrics.low) else {
        return Vec::new();
    };
    let height = metrics.frame_size.height;
    let margin = height * GRADUATION_EDGE_MARGIN;

    let mut first = (metrics.low / step).floor() * step;
    if first <= metrics.low {
        first += step;
    }

    let mut ticks = Vec::new();
    let mut k = 0.0;
    loop {
        let value = first + k * step;
        if value >= metrics.high {
            break;
        }
        let y = metrics.y_pos(value);
        if y > margin && y < height - margin {
            ticks.push(PriceTick {
                value,
                percent: metrics.percent(value),
                y,
            });
        }
        k += 1.0;
    }
    ticks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graduation_step_walks_ladder_then_decades() {
        assert_eq!(graduation_step(0.0003), Some(0.0001));
        assert_eq!(graduation_step(9.0), Some(2.0));
        assert_eq!(graduation_step(4000.0), Some(1000.0));
        assert_eq!(graduation_step(12_000.0), Some(2500.0));
        assert_eq!(graduation_step(400_000.0), Some(100_000.0));
        assert_eq!(graduation_step(0.0), None);
    }

    #[test]
    fn y_pos_maps_bounds_to_edges() {
        let metrics = MetricsY {
            high: 110.0,
            low: 100.0,
            frame_size: Size::new(300.0, 200.0),
            count: 1,
            ..MetricsY::default()
        };
        assert_eq!(metrics.y_pos(110.0), 0.0);
        assert_eq!(metrics.y_pos(100.0), 200.0);
        assert_eq!(metrics.y_pos(105.0), 100.0);
        assert!((metrics.price_at(100.0) - 105.0).abs() < 1e-9);
    }

    #[test]
    fn price_ticks_stay_off_the_edges() {
        let metrics = MetricsY {
            high: 110.0,
            low: 100.0,
            ref_price: 100.0,
            frame_size: Size::new(300.0, 200.0),
            count: 1,
            ..MetricsY::default()
        };
        let values: Vec<f64> = price_ticks(&metrics).iter().map(|t| t.value).collect();
        assert_eq!(values, vec![102.0, 104.0, 106.0, 108.0]);
    }
}
