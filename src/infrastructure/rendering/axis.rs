use std::collections::BTreeMap;

use serde::Serialize;

use super::pool::Pool;
use crate::domain::chart::{
    ChartSettings, Color, MetricsX, MetricsY, NumberFormat, PriceTick, Rect, Variation, format_percent,
};

const LABEL_POOL_CAPACITY: usize = 32;
/// Tick labels start this far left of their tick.
const X_LABEL_LEAD: f64 = 10.0;
const X_LABEL_MIN_WIDTH: f64 = 30.0;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AxisLabel {
    pub text: String,
    pub frame: Rect,
    pub value: f64,
    pub background: Option<Color>,
}

/// Label pool traffic of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LabelStats {
    pub created: usize,
    pub reused: usize,
    pub recycled: usize,
}

fn text_width(text: &str, settings: &ChartSettings) -> f64 {
    text.chars().count() as f64 * settings.label_char_width
}

fn take_label(pool: &mut Pool<AxisLabel>, stats: &mut LabelStats) -> AxisLabel {
    match pool.take() {
        Some(label) => {
            stats.reused += 1;
            label
        }
        None => {
            stats.created += 1;
            AxisLabel::default()
        }
    }
}

/// Time labels under the plot, keyed by tick timestamp. Frames are in
/// content pixels like the ticks they label.
#[derive(Debug)]
pub struct XAxis {
    labels: BTreeMap<i64, AxisLabel>,
    pool: Pool<AxisLabel>,
}

impl Default for XAxis {
    fn default() -> Self {
        Self::new()
    }
}

impl XAxis {
    pub fn new() -> Self {
        Self {
            labels: BTreeMap::new(),
            pool: Pool::new(LABEL_POOL_CAPACITY),
        }
    }

    pub fn update(&mut self, plan: &MetricsX, metrics: &MetricsY, settings: &ChartSettings) -> LabelStats {
        let frame = metrics.visible_frame();
        let mut stats = LabelStats::default();

        let wanted: BTreeMap<i64, usize> = plan
            .ticks
            .iter()
            .enumerate()
            .filter(|(_, tick)| {
                let left = tick.pixel_x - X_LABEL_LEAD;
                let right = tick.pixel_x + 2.0 * X_LABEL_LEAD;
                left < frame.max_x() && right > frame.x
            })
            .map(|(i, tick)| (tick.value as i64, i))
            .collect();

        let leaving: Vec<i64> = self
            .labels
            .keys()
            .copied()
            .filter(|key| !wanted.contains_key(key))
            .collect();
        for key in leaving {
            if let Some(label) = self.labels.remove(&key) {
                stats.recycled += 1;
                self.pool.put(label);
            }
        }

        for (key, tick_index) in wanted {
            let tick = &plan.ticks[tick_index];
            let mut label = match self.labels.remove(&key) {
                Some(label) => label,
                None => take_label(&mut self.pool, &mut stats),
            };
            let width = text_width(&tick.label, settings).max(X_LABEL_MIN_WIDTH);
            label.text.clear();
            label.text.push_str(&tick.label);
            label.frame = Rect::new(tick.pixel_x - X_LABEL_LEAD, 0.0, width, settings.label_line_height);
            label.value = tick.value;
            label.background = None;
            self.labels.insert(key, label);
        }
        stats
    }

    pub fn clear(&mut self) {
        for (_, label) in std::mem::take(&mut self.labels) {
            self.pool.put(label);
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = &AxisLabel> {
        self.labels.values()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YAxisMode {
    Value,
    Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentPriceLabel {
    pub label: AxisLabel,
    pub variation: Variation,
}

/// Price labels beside the plot. Frames are viewport-local.
#[derive(Debug)]
pub struct YAxis {
    mode: YAxisMode,
    format: NumberFormat,
    labels: Vec<AxisLabel>,
    pool: Pool<AxisLabel>,
    reference: Option<AxisLabel>,
    current: Option<CurrentPriceLabel>,
    variation: Variation,
}

impl YAxis {
    pub fn new(mode: YAxisMode, format: NumberFormat) -> Self {
        Self {
            mode,
            format,
            labels: Vec::new(),
            pool: Pool::new(LABEL_POOL_CAPACITY),
            reference: None,
            current: None,
            variation: Variation::Neutral,
        }
    }

    pub fn mode(&self) -> YAxisMode {
        self.mode
    }

    pub fn set_format(&mut self, format: NumberFormat) {
        self.format = format;
    }

    fn text(&self, price: f64, metrics: &MetricsY) -> String {
        match self.mode {
            YAxisMode::Value => self.format.format(price),
            YAxisMode::Percent => format_percent(metrics.percent(price)),
        }
    }

    fn place(&self, label: &mut AxisLabel, text: &str, price: f64, metrics: &MetricsY, settings: &ChartSettings) {
        let height = settings.label_line_height;
        label.text.clear();
        label.text.push_str(text);
        label.frame = Rect::new(
            0.0,
            metrics.y_pos(price) - height / 2.0,
            text_width(text, settings),
            height,
        );
        label.value = price;
        label.background = None;
    }

    pub fn update(&mut self, ticks: &[PriceTick], metrics: &MetricsY, settings: &ChartSettings) -> LabelStats {
        let mut stats = LabelStats::default();
        for label in self.labels.drain(..) {
            stats.recycled += 1;
            self.pool.put(label);
        }

        for tick in ticks {
            let mut label = take_label(&mut self.pool, &mut stats);
            self.place(&mut label, &self.text(tick.value, metrics), tick.value, metrics, settings);
            self.labels.push(label);
        }

        self.reference = (settings.show_reference_price
            && !metrics.is_empty()
            && metrics.contains_price(metrics.ref_price))
        .then(|| {
            let text = match self.mode {
                YAxisMode::Value => self.format.format(metrics.ref_price),
                YAxisMode::Percent => format_percent(0.0),
            };
            let mut label = AxisLabel::default();
            self.place(&mut label, &text, metrics.ref_price, metrics, settings);
            label
        });

        self.refresh_current(metrics, settings);
        stats
    }

    /// Re-places the current price label after a streaming tick.
    pub fn refresh_current(&mut self, metrics: &MetricsY, settings: &ChartSettings) {
        let price = metrics.last_close_price;
        self.current = (settings.show_current_price && !metrics.is_empty() && metrics.contains_price(price))
            .then(|| {
                let background = match self.variation {
                    Variation::Positive => settings.positive,
                    Variation::Negative => settings.negative,
                    Variation::Neutral => settings.no_change,
                };
                let mut label = AxisLabel::default();
                self.place(&mut label, &self.text(price, metrics), price, metrics, settings);
                label.background = Some(background);
                CurrentPriceLabel {
                    label,
                    variation: self.variation,
                }
            });
    }

    pub fn set_variation(&mut self, variation: Variation) {
        self.variation = variation;
    }

    pub fn clear(&mut self) {
        for label in self.labels.drain(..) {
            self.pool.put(label);
        }
        self.reference = None;
        self.current = None;
    }

    pub fn labels(&self) -> &[AxisLabel] {
        &self.labels
    }

    pub fn reference(&self) -> Option<&AxisLabel> {
        self.reference.as_ref()
    }

    pub fn current(&self) -> Option<&CurrentPriceLabel> {
        self.current.as_ref()
    }
}
