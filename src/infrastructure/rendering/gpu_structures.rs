use bytemuck::{Pod, Zeroable};

use crate::domain::chart::{Color, MetricsY, Point, Rect};

/// What a vertex belongs to, stored as a float for the shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Body,
    Wick,
    Line,
    Grid,
    HorizontalLine,
    Selection,
    Fill,
}

impl ElementType {
    pub fn code(&self) -> f32 {
        match self {
            ElementType::Body => 0.0,
            ElementType::Wick => 1.0,
            ElementType::Line => 2.0,
            ElementType::Grid => 3.0,
            ElementType::HorizontalLine => 4.0,
            ElementType::Selection => 5.0,
            ElementType::Fill => 6.0,
        }
    }
}

/// Vertex handed to a GPU or canvas host, positions in NDC.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ChartVertex {
    pub position_x: f32,
    pub position_y: f32,
    pub element_type: f32,
    pub color: [f32; 4],
}

impl ChartVertex {
    pub fn new(position: [f32; 2], element: ElementType, color: Color) -> Self {
        Self {
            position_x: position[0],
            position_y: position[1],
            element_type: element.code(),
            color: color.to_array(),
        }
    }
}

/// Raw bytes of a vertex buffer, ready for upload.
pub fn vertex_bytes(vertices: &[ChartVertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

/// Content pixels to normalized device coordinates for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NdcMapper {
    width: f64,
    height: f64,
    offset: f64,
}

impl NdcMapper {
    pub fn new(metrics: &MetricsY) -> Self {
        let positive = |v: f64| if v > 0.0 { v } else { 1.0 };
        Self {
            width: positive(metrics.frame_size.width),
            height: positive(metrics.frame_size.height),
            offset: metrics.frame_offset,
        }
    }

    /// Viewport-local input, no scroll offset applied.
    pub fn viewport(width: f64, height: f64) -> Self {
        Self {
            width: if width > 0.0 { width } else { 1.0 },
            height: if height > 0.0 { height } else { 1.0 },
            offset: 0.0,
        }
    }

    pub fn to_ndc(&self, x: f64, y: f64) -> [f32; 2] {
        [
            ((x - self.offset) / self.width * 2.0 - 1.0) as f32,
            (1.0 - y / self.height * 2.0) as f32,
        ]
    }

    fn quad(&self, corners: [(f64, f64); 4], colors: [Color; 4], element: ElementType) -> [ChartVertex; 6] {
        let v = |i: usize| ChartVertex::new(self.to_ndc(corners[i].0, corners[i].1), element, colors[i]);
        [v(0), v(1), v(2), v(0), v(2), v(3)]
    }

    pub fn rect(&self, rect: Rect, color: Color, element: ElementType) -> [ChartVertex; 6] {
        self.quad(
            [
                (rect.x, rect.y),
                (rect.max_x(), rect.y),
                (rect.max_x(), rect.max_y()),
                (rect.x, rect.max_y()),
            ],
            [color; 4],
            element,
        )
    }

    pub fn segment(&self, a: Point, b: Point, width: f64, color: Color, element: ElementType) -> [ChartVertex; 6] {
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let length = (dx * dx + dy * dy).sqrt();
        let (nx, ny) = if length > 0.0 {
            (-dy / length * width / 2.0, dx / length * width / 2.0)
        } else {
            (0.0, width / 2.0)
        };
        self.quad(
            [
                (a.x + nx, a.y + ny),
                (b.x + nx, b.y + ny),
                (b.x - nx, b.y - ny),
                (a.x - nx, a.y - ny),
            ],
            [color; 4],
            element,
        )
    }

    pub fn polyline(&self, points: &[Point], width: f64, color: Color, element: ElementType) -> Vec<ChartVertex> {
        points
            .windows(2)
            .flat_map(|pair| self.segment(pair[0], pair[1], width, color, element))
            .collect()
    }

    /// Area under `points` down to `baseline`, shaded from `top` to `bottom`.
    pub fn area(&self, points: &[Point], baseline: f64, top: Color, bottom: Color, element: ElementType) -> Vec<ChartVertex> {
        points
            .windows(2)
            .flat_map(|pair| {
                self.quad(
                    [
                        (pair[0].x, pair[0].y),
                        (pair[1].x, pair[1].y),
                        (pair[1].x, baseline),
                        (pair[0].x, baseline),
                    ],
                    [top, top, bottom, bottom],
                    element,
                )
            })
            .collect()
    }
}
