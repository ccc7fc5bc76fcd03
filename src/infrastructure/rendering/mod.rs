pub mod axis;
pub mod gpu_structures;
pub mod graph_layers;
pub mod grid;
pub mod hlines;
pub mod pool;
pub mod selection;

pub use axis::{AxisLabel, CurrentPriceLabel, LabelStats, XAxis, YAxis, YAxisMode};
pub use gpu_structures::{ChartVertex, ElementType, NdcMapper, vertex_bytes};
pub use graph_layers::{GraphLayer, LastQuoteUpdate, LayerUpdate, RenderStats};
pub use grid::{Grid, GridLine};
pub use hlines::{HLine, HLineSet, HLineStyle, PlacedHLine};
pub use selection::{GesturePhase, InfoBox, SelectionMarker, SelectionOverlay};
