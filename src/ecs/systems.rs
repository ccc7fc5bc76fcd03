use hecs::World;

use super::components::{LinePrimitive, PointPrimitive};
use crate::domain::chart::{ChartSettings, MetricsY};
use crate::infrastructure::rendering::gpu_structures::{ChartVertex, ElementType, NdcMapper};

/// Flattens every attached primitive into triangles for the host renderer.
/// Primitives are sorted by quote index so the output is deterministic.
pub fn collect_vertices(world: &World, metrics: &MetricsY, settings: &ChartSettings) -> Vec<ChartVertex> {
    let mapper = NdcMapper::new(metrics);
    let mut vertices = Vec::new();

    let mut line_query = world.query::<&LinePrimitive>();
    for (_, line) in line_query.iter() {
        if let (Some(top), Some(bottom)) = (line.gradient_top, line.gradient_bottom) {
            vertices.extend(mapper.area(&line.points, line.baseline, top, bottom, ElementType::Fill));
        }
        if let Some(stroke) = line.stroke {
            vertices.extend(mapper.polyline(&line.points, line.width, stroke, ElementType::Line));
        }
    }

    let mut points_query = world.query::<&PointPrimitive>();
    let mut points: Vec<&PointPrimitive> = points_query.iter().map(|(_, p)| p).collect();
    points.sort_by_key(|p| p.quote_index);
    for point in points {
        let color = point
            .fill
            .unwrap_or_else(|| settings.variation_color(point.positive));
        let rects = point.geometry.rects();
        for (i, rect) in rects.iter().enumerate() {
            let element = if i == rects.len() - 1 && rects.len() == 2 {
                ElementType::Body
            } else {
                ElementType::Wick
            };
            vertices.extend(mapper.rect(*rect, color, element));
        }
    }
    vertices
}
