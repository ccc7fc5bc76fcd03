use super::value_objects::Color;
use crate::domain::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

const MAX_UTC_OFFSET_SECONDS: i32 = 18 * 3600;

/// Per-chart configuration. Every chart owns its own copy, nothing here is
/// process-global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    /// Upper bound on buffered quotes, 0 = unbounded
    pub max_points_count: usize,
    /// Fit every quote into the viewport even for candles and bars.
    pub display_all_points: bool,

    pub positive: Color,
    pub negative: Color,
    pub positive_light: Color,
    pub negative_light: Color,
    pub no_change: Color,
    pub grid_color: Color,
    pub selection_color: Color,
    pub candle_border_color: Color,
    pub position_color: Color,
    pub order_color: Color,
    pub background: Color,

    pub grid_line_width: f64,
    pub line_width: f64,
    pub selection_show_quote_info: bool,
    pub line_listen_to_price_direction: bool,
    pub show_reference_price: bool,
    pub show_current_price: bool,

    pub candle_min_point_width: f64,
    pub min_point_margin: f64,
    pub primitive_pool_capacity: usize,

    /// Time zone used for axis and selection labels
    pub utc_offset_seconds: i32,
    pub grouping: bool,
    pub label_char_width: f64,
    pub label_line_height: f64,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            max_points_count: 0,
            display_all_points: false,
            positive: Color::from_hex(0x26a69a),
            negative: Color::from_hex(0xef5350),
            positive_light: Color::from_hex(0x26a69a).with_alpha(0.25),
            negative_light: Color::from_hex(0xef5350).with_alpha(0.25),
            no_change: Color::from_hex(0x9e9e9e),
            grid_color: Color::from_hex(0x2a2e39),
            selection_color: Color::from_hex(0xb2b5be),
            candle_border_color: Color::from_hex(0x131722),
            position_color: Color::from_hex(0x2962ff),
            order_color: Color::from_hex(0xff9800),
            background: Color::from_hex(0x131722),
            grid_line_width: 0.5,
            line_width: 1.5,
            selection_show_quote_info: true,
            line_listen_to_price_direction: true,
            show_reference_price: true,
            show_current_price: true,
            candle_min_point_width: 5.0,
            min_point_margin: 1.0,
            primitive_pool_capacity: 5,
            utc_offset_seconds: 0,
            grouping: false,
            label_char_width: 6.0,
            label_line_height: 12.0,
        }
    }
}

impl ChartSettings {
    /// Missing fields fall back to defaults, the result is validated.
    pub fn from_json(json: &str) -> AppResult<Self> {
        let settings: ChartSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> AppResult<()> {
        let widths = [
            ("grid_line_width", self.grid_line_width),
            ("line_width", self.line_width),
            ("candle_min_point_width", self.candle_min_point_width),
            ("min_point_margin", self.min_point_margin),
            ("label_char_width", self.label_char_width),
            ("label_line_height", self.label_line_height),
        ];
        for (name, value) in widths {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::ConfigurationError(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.candle_min_point_width + self.min_point_margin <= 0.0 {
            return Err(AppError::ConfigurationError(
                "candle_min_point_width + min_point_margin must be positive".to_string(),
            ));
        }
        if self.primitive_pool_capacity == 0 {
            return Err(AppError::ConfigurationError(
                "primitive_pool_capacity must be at least 1".to_string(),
            ));
        }
        if self.utc_offset_seconds.abs() > MAX_UTC_OFFSET_SECONDS {
            return Err(AppError::ConfigurationError(format!(
                "utc_offset_seconds out of range: {}",
                self.utc_offset_seconds
            )));
        }
        Ok(())
    }

    pub fn variation_color(&self, positive: bool) -> Color {
        if positive { self.positive } else { self.negative }
    }

    pub fn variation_light_color(&self, positive: bool) -> Color {
        if positive {
            self.positive_light
        } else {
            self.negative_light
        }
    }
}
