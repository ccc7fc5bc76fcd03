use super::gpu_structures::{ChartVertex, ElementType, NdcMapper};
use crate::domain::chart::{ChartSettings, ChartStyle, MetricsY, NumberFormat, Point, Rect};
use crate::domain::market_data::{Quote, QuoteStore};
use crate::time_utils::format_quote_time;

/// Gap between the pointer and the info box.
const INFO_BOX_GAP: f64 = 5.0;
const INFO_BOX_PADDING: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    Cancelled,
}

impl GesturePhase {
    pub fn is_active(&self) -> bool {
        matches!(self, GesturePhase::Began | GesturePhase::Changed)
    }
}

/// Marker drawn over the selected quote, viewport-local.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionMarker {
    /// Line style: vertical and horizontal hairlines through the close.
    Crosshair { vertical: (Point, Point), horizontal: (Point, Point) },
    /// Candles and bars: the whole column of the quote.
    Column(Rect),
}

/// OHLC readout next to the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoBox {
    pub frame: Rect,
    pub lines: Vec<String>,
}

#[derive(Debug, Default)]
pub struct SelectionOverlay {
    quote: Option<Quote>,
    marker: Option<SelectionMarker>,
    info: Option<InfoBox>,
}

impl SelectionOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one gesture step. Returns the selected quote while the gesture
    /// is active and over a visible quote.
    #[allow(clippy::too_many_arguments)]
    pub fn handle(
        &mut self,
        phase: GesturePhase,
        pointer: Point,
        store: &QuoteStore,
        metrics: &MetricsY,
        style: ChartStyle,
        settings: &ChartSettings,
        format: NumberFormat,
    ) -> Option<Quote> {
        if !phase.is_active() {
            self.hide();
            return None;
        }
        let Some(quote) = metrics.index_at(pointer.x).and_then(|index| store.get(index)).copied() else {
            self.hide();
            return None;
        };

        let x = metrics.x_pos(quote.index) - metrics.frame_offset;
        let height = metrics.frame_size.height;
        self.marker = Some(match style {
            ChartStyle::Line => {
                let y = metrics.y_pos(quote.close);
                SelectionMarker::Crosshair {
                    vertical: (Point::new(x, 0.0), Point::new(x, height)),
                    horizontal: (Point::new(0.0, y), Point::new(metrics.frame_size.width, y)),
                }
            }
            _ => SelectionMarker::Column(Rect::new(x, 0.0, metrics.x_delta, height)),
        });
        self.info = settings
            .selection_show_quote_info
            .then(|| info_box(&quote, pointer, metrics, settings, format));
        self.quote = Some(quote);
        Some(quote)
    }

    pub fn hide(&mut self) {
        self.quote = None;
        self.marker = None;
        self.info = None;
    }

    pub fn is_visible(&self) -> bool {
        self.marker.is_some()
    }

    pub fn quote(&self) -> Option<&Quote> {
        self.quote.as_ref()
    }

    pub fn marker(&self) -> Option<&SelectionMarker> {
        self.marker.as_ref()
    }

    pub fn info(&self) -> Option<&InfoBox> {
        self.info.as_ref()
    }

    pub fn vertices(&self, mapper: &NdcMapper, settings: &ChartSettings) -> Vec<ChartVertex> {
        let color = settings.selection_color;
        match self.marker {
            Some(SelectionMarker::Crosshair {
                vertical,
                horizontal,
            }) => {
                let mut vertices = mapper
                    .segment(vertical.0, vertical.1, 1.0, color, ElementType::Selection)
                    .to_vec();
                vertices.extend(mapper.segment(horizontal.0, horizontal.1, 1.0, color, ElementType::Selection));
                vertices
            }
            Some(SelectionMarker::Column(rect)) => mapper
                .rect(rect, color.with_alpha(0.2), ElementType::Selection)
                .to_vec(),
            None => Vec::new(),
        }
    }
}

fn info_box(quote: &Quote, pointer: Point, metrics: &MetricsY, settings: &ChartSettings, format: NumberFormat) -> InfoBox {
    let lines = vec![
        format!("O: {}", format.format(quote.open)),
        format!("H: {}", format.format(quote.high)),
        format!("L: {}", format.format(quote.low)),
        format!("C: {}", format.format(quote.close)),
        format_quote_time(quote.timestamp, settings.utc_offset_seconds),
    ];
    let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as f64;
    let width = widest * settings.label_char_width + INFO_BOX_PADDING;
    let height = lines.len() as f64 * settings.label_line_height + INFO_BOX_PADDING;
    InfoBox {
        frame: place_info_box(pointer, width, height, metrics.frame_size.width, metrics.frame_size.height),
        lines,
    }
}

/// Right of and above the pointer, flipped or clamped to stay inside.
pub fn place_info_box(pointer: Point, width: f64, height: f64, frame_width: f64, frame_height: f64) -> Rect {
    let mut x = pointer.x + INFO_BOX_GAP;
    if x + width > frame_width {
        x = pointer.x - INFO_BOX_GAP - width;
    }
    let x = x.max(0.0);

    let mut y = (pointer.y - height).max(INFO_BOX_GAP);
    if y + height > frame_height {
        y = (frame_height - height).max(0.0);
    }
    Rect::new(x, y, width, height)
}
