use crate::domain::errors::AppError;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

/// Value Object - how quotes are drawn
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ChartStyle {
    #[default]
    #[display(fmt = "Undefined")]
    #[strum(serialize = "undefined")]
    Undefined,
    #[display(fmt = "Candlestick")]
    #[strum(serialize = "candlestick")]
    Candlestick,
    #[display(fmt = "Bar")]
    #[strum(serialize = "bar")]
    Bar,
    #[display(fmt = "Line")]
    #[strum(serialize = "line")]
    Line,
}

impl ChartStyle {
    /// Candles and bars keep a minimum width and scroll, lines always fit.
    pub fn has_fixed_point_width(&self) -> bool {
        matches!(self, ChartStyle::Candlestick | ChartStyle::Bar)
    }

    pub fn bounds_type(&self) -> BoundsType {
        match self {
            ChartStyle::Line => BoundsType::Close,
            _ => BoundsType::HighLow,
        }
    }
}

/// Which quote fields feed the price bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
pub enum BoundsType {
    #[display(fmt = "close")]
    Close,
    #[default]
    #[display(fmt = "high/low")]
    HighLow,
    #[display(fmt = "volume")]
    Volume,
}

/// Sign of the visible move, tracked with hysteresis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum PriceDirection {
    #[display(fmt = "up")]
    Up,
    #[display(fmt = "down")]
    Down,
}

impl PriceDirection {
    pub fn between(from: f64, to: f64) -> Self {
        if to >= from { Self::Up } else { Self::Down }
    }
}

/// Colour class of the last tick, drives the current price label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variation {
    #[default]
    #[display(fmt = "neutral")]
    Neutral,
    #[display(fmt = "positive")]
    Positive,
    #[display(fmt = "negative")]
    Negative,
}

impl Variation {
    pub fn between(previous: f64, current: f64) -> Self {
        if current > previous {
            Self::Positive
        } else if current < previous {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}

/// Inclusive quote index interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RangeIndex {
    pub start: usize,
    pub end: usize,
}

impl RangeIndex {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index <= self.end
    }

    pub fn contains_range(&self, other: &RangeIndex) -> bool {
        self.contains(other.start) && self.contains(other.end)
    }

    pub fn iter(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.max_x() && other.x < self.max_x() && self.y < other.max_y() && other.y < self.max_y()
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.max_x() && point.y >= self.y && point.y <= self.max_y()
    }
}

/// Value Object - Color (linear RGBA in 0..1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::rgb(r, g, b)
    }

    /// Parses `#rrggbb` or `#rrggbbaa`.
    pub fn parse(value: &str) -> Result<Self, AppError> {
        let digits = value.trim().trim_start_matches('#');
        let raw = u32::from_str_radix(digits, 16)
            .map_err(|_| AppError::ParseError(format!("Invalid color: {}", value)))?;
        match digits.len() {
            6 => Ok(Self::from_hex(raw)),
            8 => Ok(Self::from_hex(raw >> 8).with_alpha((raw & 0xFF) as f32 / 255.0)),
            _ => Err(AppError::ParseError(format!("Invalid color: {}", value))),
        }
    }

    pub fn to_hex_string(&self) -> String {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", channel(self.r), channel(self.g), channel(self.b))
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                channel(self.r),
                channel(self.g),
                channel(self.b),
                channel(self.a)
            )
        }
    }

    pub fn with_alpha(&self, alpha: f32) -> Self {
        Self { a: alpha, ..*self }
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);
}

impl TryFrom<String> for Color {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex_string()
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}
