pub mod chart_view;
pub mod refresh_gate;

pub use chart_view::ChartView;
pub use refresh_gate::RefreshGate;
