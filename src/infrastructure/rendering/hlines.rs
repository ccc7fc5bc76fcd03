use serde::{Deserialize, Serialize};

use super::gpu_structures::{ChartVertex, ElementType, NdcMapper};
use crate::domain::chart::{Color, MetricsY, Point};

/// Share of the folded span added above and below in adjust mode.
const ADJUST_MARGIN_RATIO: f64 = 1.0 / 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HLineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Horizontal reference line (position, order, alert level...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HLine {
    pub id: String,
    pub value: f64,
    #[serde(default)]
    pub style: HLineStyle,
    pub color: Color,
    #[serde(default)]
    pub label: Option<String>,
}

impl HLine {
    pub fn new(id: &str, value: f64, style: HLineStyle, color: Color, label: Option<String>) -> Self {
        Self {
            id: id.to_string(),
            value,
            style,
            color,
            label,
        }
    }
}

/// A line that currently falls inside the price bounds, viewport-local.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedHLine {
    pub id: String,
    pub y: f64,
    pub style: HLineStyle,
    pub color: Color,
    pub label: Option<String>,
}

/// Registered lines of one chart. Ids are unique, adding an existing id
/// replaces the previous line.
#[derive(Debug, Default)]
pub struct HLineSet {
    lines: Vec<HLine>,
    placed: Vec<PlacedHLine>,
    adjust_vertical_scale: bool,
}

impl HLineSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when a line with the same id was replaced.
    pub fn add(&mut self, line: HLine) -> bool {
        match self.lines.iter_mut().find(|existing| existing.id == line.id) {
            Some(existing) => {
                *existing = line;
                true
            }
            None => {
                self.lines.push(line);
                false
            }
        }
    }

    /// Number of lines removed.
    pub fn remove(&mut self, id: &str) -> usize {
        let before = self.lines.len();
        self.lines.retain(|line| line.id != id);
        self.placed.retain(|line| line.id != id);
        before - self.lines.len()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.placed.clear();
    }

    pub fn lines(&self) -> &[HLine] {
        &self.lines
    }

    pub fn placed(&self) -> &[PlacedHLine] {
        &self.placed
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn adjust_vertical_scale(&self) -> bool {
        self.adjust_vertical_scale
    }

    pub fn set_adjust_vertical_scale(&mut self, adjust: bool) {
        self.adjust_vertical_scale = adjust;
    }

    /// (high, low) over registered line values.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.lines.iter().fold(None, |acc, line| match acc {
            None => Some((line.value, line.value)),
            Some((high, low)) => Some((high.max(line.value), low.min(line.value))),
        })
    }

    /// Some line lies outside the natural bounds of `metrics`.
    pub fn has_line_outside(&self, metrics: &MetricsY) -> bool {
        !metrics.is_empty() && self.lines.iter().any(|line| !metrics.contains_price(line.value))
    }

    /// Widens the bounds to lines outside them when adjust mode is on.
    /// Only the side a line crosses moves, returns whether any did.
    pub fn adjust_bounds(&self, metrics: &mut MetricsY) -> bool {
        if !self.adjust_vertical_scale || metrics.is_empty() {
            return false;
        }
        let Some((lines_high, lines_low)) = self.bounds() else {
            return false;
        };
        let (above, below) = (lines_high > metrics.high, lines_low < metrics.low);
        if !above && !below {
            return false;
        }
        let high = metrics.high.max(lines_high);
        let low = metrics.low.min(lines_low);
        let margin = (high - low) * ADJUST_MARGIN_RATIO;
        if above {
            metrics.high = high + margin;
        }
        if below {
            metrics.low = low - margin;
        }
        true
    }

    /// Positions lines inside the bounds and hides the others.
    pub fn layout(&mut self, metrics: &MetricsY) {
        self.placed.clear();
        if metrics.is_empty() {
            return;
        }
        self.placed.extend(
            self.lines
                .iter()
                .filter(|line| metrics.contains_price(line.value))
                .map(|line| PlacedHLine {
                    id: line.id.clone(),
                    y: metrics.y_pos(line.value),
                    style: line.style,
                    color: line.color,
                    label: line.label.clone(),
                }),
        );
    }

    pub fn vertices(&self, mapper: &NdcMapper, width: f64) -> Vec<ChartVertex> {
        let mut vertices = Vec::new();
        for line in &self.placed {
            let (dash, gap) = match line.style {
                HLineStyle::Solid => (width, 0.0),
                HLineStyle::Dashed => (6.0, 4.0),
                HLineStyle::Dotted => (1.0, 3.0),
            };
            let mut x = 0.0;
            while x < width {
                let end = (x + dash).min(width);
                vertices.extend(mapper.segment(
                    Point::new(x, line.y),
                    Point::new(end, line.y),
                    1.0,
                    line.color,
                    ElementType::HorizontalLine,
                ));
                x = end + gap;
                if gap <= 0.0 {
                    break;
                }
            }
        }
        vertices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::Size;

    fn metrics(high: f64, low: f64) -> MetricsY {
        MetricsY {
            high,
            low,
            frame_size: Size::new(100.0, 100.0),
            count: 10,
            ..MetricsY::default()
        }
    }

    #[test]
    fn adjust_folds_lines_with_margin() {
        let mut set = HLineSet::new();
        set.add(HLine::new("order", 140.0, HLineStyle::Dashed, Color::WHITE, None));
        let mut m = metrics(120.0, 100.0);
        assert!(set.has_line_outside(&m));
        assert!(!set.adjust_bounds(&mut m));

        set.set_adjust_vertical_scale(true);
        assert!(set.adjust_bounds(&mut m));
        assert_eq!(m.high, 142.0);
        assert_eq!(m.low, 100.0);
    }

    #[test]
    fn adjust_leaves_bounds_alone_when_lines_fit() {
        let mut set = HLineSet::new();
        set.set_adjust_vertical_scale(true);
        set.add(HLine::new("alert", 110.0, HLineStyle::Solid, Color::WHITE, None));
        let mut m = metrics(120.0, 100.0);
        assert!(!set.adjust_bounds(&mut m));
        assert_eq!((m.high, m.low), (120.0, 100.0));
    }
}
