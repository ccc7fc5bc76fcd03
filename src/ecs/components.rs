use crate::domain::chart::{Color, Point, Rect};

/// Shape of one candle or bar, in content pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointGeometry {
    Candle { body: Rect, wick: Rect },
    Bar { stem: Rect, open_tick: Rect, close_tick: Rect },
}

impl Default for PointGeometry {
    fn default() -> Self {
        PointGeometry::Candle {
            body: Rect::default(),
            wick: Rect::default(),
        }
    }
}

impl PointGeometry {
    pub fn rects(&self) -> Vec<Rect> {
        match *self {
            PointGeometry::Candle { body, wick } => vec![wick, body],
            PointGeometry::Bar {
                stem,
                open_tick,
                close_tick,
            } => vec![stem, open_tick, close_tick],
        }
    }
}

/// One quote drawn as a candle or a bar. Lives either attached in the
/// scene or parked in its layer's pool, never both.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointPrimitive {
    pub quote_index: usize,
    pub positive: bool,
    pub geometry: PointGeometry,
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
}

/// Close path of the line style plus its gradient fill.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinePrimitive {
    pub points: Vec<Point>,
    pub stroke: Option<Color>,
    pub width: f64,
    pub gradient_top: Option<Color>,
    pub gradient_bottom: Option<Color>,
    /// y of the bottom edge the fill closes on
    pub baseline: f64,
}
