pub mod logging;
pub mod rendering;
pub mod wire;
