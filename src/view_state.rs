/// Zoom bounds of the chart.
pub const MIN_SCALE: f64 = 1.0;
pub const MAX_SCALE: f64 = 300.0;
/// Width at the end of the content that counts as "last point visible".
const LAST_POINT_SLACK: f64 = 5.0;

/// Quote position under the zoom anchor, captured before the zoom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomAnchor {
    pub anchor_x: f64,
    /// Position in quote slots, fractional
    pub slot: f64,
}

/// Horizontal scroll and zoom of one chart, in content pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollState {
    offset: f64,
    scale: f64,
    content_width: f64,
    viewport_width: f64,
}

impl ScrollState {
    pub fn new(viewport_width: f64) -> Self {
        Self {
            offset: 0.0,
            scale: MIN_SCALE,
            content_width: 0.0,
            viewport_width: viewport_width.max(0.0),
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn content_width(&self) -> f64 {
        self.content_width
    }

    pub fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    pub fn max_offset(&self) -> f64 {
        (self.content_width - self.viewport_width).max(0.0)
    }

    /// Returns `true` when the offset moved.
    pub fn scroll_to(&mut self, offset: f64) -> bool {
        let clamped = if offset.is_finite() {
            offset.clamp(0.0, self.max_offset())
        } else {
            0.0
        };
        let moved = clamped != self.offset;
        self.offset = clamped;
        moved
    }

    pub fn scroll_to_first(&mut self) -> bool {
        self.scroll_to(0.0)
    }

    pub fn scroll_to_last(&mut self) -> bool {
        self.scroll_to(self.max_offset())
    }

    /// Updates the content width, returns `true` if the offset had to be
    /// clamped into the new bounds.
    pub fn set_content_width(&mut self, width: f64) -> bool {
        self.content_width = width.max(0.0);
        self.scroll_to(self.offset)
    }

    pub fn set_viewport_width(&mut self, width: f64) -> bool {
        self.viewport_width = width.max(0.0);
        self.scroll_to(self.offset)
    }

    /// Clamped to `[MIN_SCALE, MAX_SCALE]`, returns `true` on change.
    pub fn set_scale(&mut self, scale: f64) -> bool {
        let clamped = if scale.is_finite() {
            scale.clamp(MIN_SCALE, MAX_SCALE)
        } else {
            MIN_SCALE
        };
        let changed = clamped != self.scale;
        self.scale = clamped;
        changed
    }

    /// Multiplies the scale, remembering which quote slot sits under
    /// `anchor_x` so [`ScrollState::apply_anchor`] can keep it there.
    pub fn zoom_at(&mut self, factor: f64, anchor_x: f64, x_delta: f64) -> Option<ZoomAnchor> {
        if x_delta <= 0.0 || !self.set_scale(self.scale * factor) {
            return None;
        }
        Some(ZoomAnchor {
            anchor_x,
            slot: (self.offset + anchor_x) / x_delta,
        })
    }

    /// Restores the anchored slot under its pointer after the spacing changed.
    pub fn apply_anchor(&mut self, anchor: ZoomAnchor, x_delta: f64, content_width: f64) {
        self.content_width = content_width.max(0.0);
        self.scroll_to(anchor.slot * x_delta - anchor.anchor_x);
    }

    /// Back to scale 1 with no known content width.
    pub fn reset(&mut self) {
        self.scale = MIN_SCALE;
        self.content_width = 0.0;
        self.offset = 0.0;
    }

    /// The last few pixels of content intersect the viewport.
    pub fn is_last_point_visible(&self) -> bool {
        if self.content_width <= 0.0 {
            return true;
        }
        let tail_start = (self.content_width - LAST_POINT_SLACK).max(0.0);
        tail_start < self.offset + self.viewport_width && self.content_width > self.offset
    }
}
