//! Chart aggregate: viewport metrics, axis planning, settings and value objects.

pub mod format;
pub mod metrics;
pub mod settings;
pub mod time_axis;
pub mod value_objects;

pub use format::{NumberFormat, format_percent};
pub use metrics::{MetricsRequest, MetricsY, PriceTick, graduation_step, price_ticks};
pub use settings::ChartSettings;
pub use time_axis::{MetricsX, TickPoint, TickStep, TickTier, tier_for_period};
pub use value_objects::*;
