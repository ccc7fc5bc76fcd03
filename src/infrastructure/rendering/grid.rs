use super::gpu_structures::{ChartVertex, ElementType, NdcMapper};
use super::pool::Pool;
use crate::domain::chart::{ChartSettings, MetricsX, MetricsY, Point, PriceTick};

const GRID_POOL_CAPACITY: usize = 32;

/// Grid segment in content pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GridLine {
    pub from: Point,
    pub to: Point,
}

/// Horizontal lines at price graduations, vertical lines at time ticks.
#[derive(Debug)]
pub struct Grid {
    horizontal: Vec<GridLine>,
    vertical: Vec<GridLine>,
    pool: Pool<GridLine>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    pub fn new() -> Self {
        Self {
            horizontal: Vec::new(),
            vertical: Vec::new(),
            pool: Pool::new(GRID_POOL_CAPACITY),
        }
    }

    pub fn update(&mut self, ticks: &[PriceTick], plan: Option<&MetricsX>, metrics: &MetricsY) {
        self.clear();
        let frame = metrics.visible_frame();

        for tick in ticks {
            let mut line = self.pool.take().unwrap_or_default();
            line.from = Point::new(frame.x, tick.y);
            line.to = Point::new(frame.max_x(), tick.y);
            self.horizontal.push(line);
        }

        let Some(plan) = plan else {
            return;
        };
        for tick in plan
            .ticks
            .iter()
            .filter(|tick| tick.pixel_x >= frame.x && tick.pixel_x <= frame.max_x())
        {
            let mut line = self.pool.take().unwrap_or_default();
            line.from = Point::new(tick.pixel_x, 0.0);
            line.to = Point::new(tick.pixel_x, frame.height);
            self.vertical.push(line);
        }
    }

    pub fn clear(&mut self) {
        for line in self.horizontal.drain(..).chain(self.vertical.drain(..)) {
            self.pool.put(line);
        }
    }

    pub fn horizontal(&self) -> &[GridLine] {
        &self.horizontal
    }

    pub fn vertical(&self) -> &[GridLine] {
        &self.vertical
    }

    pub fn vertices(&self, mapper: &NdcMapper, settings: &ChartSettings) -> Vec<ChartVertex> {
        self.horizontal
            .iter()
            .chain(self.vertical.iter())
            .flat_map(|line| {
                mapper.segment(
                    line.from,
                    line.to,
                    settings.grid_line_width,
                    settings.grid_color,
                    ElementType::Grid,
                )
            })
            .collect()
    }
}
