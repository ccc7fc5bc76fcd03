#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod application;
pub mod domain;
pub mod ecs;
pub mod infrastructure;
pub mod presentation;
pub mod time_utils;
pub mod view_state;

pub use application::ChartView;
pub use presentation::ChartApi;

/// Installs the panic hook, console logger and browser clock.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn initialize() {
    console_error_panic_hook::set_once();
    let logger = if cfg!(debug_assertions) {
        infrastructure::logging::ConsoleLogger::new_development()
    } else {
        infrastructure::logging::ConsoleLogger::new_production()
    };
    domain::logging::init_logger(Box::new(logger));
    domain::logging::init_time_provider(Box::new(infrastructure::logging::BrowserTimeProvider));

    crate::log_info!(domain::logging::LogComponent::Presentation("Initialize"), "chart engine ready");
}

/// Same wiring for native hosts and tests: stderr logger, system clock.
/// Returns `false` when a logger was already installed.
#[cfg(not(target_arch = "wasm32"))]
pub fn initialize() -> bool {
    let installed = domain::logging::init_logger(Box::new(
        infrastructure::logging::ConsoleLogger::new_development(),
    ));
    domain::logging::init_time_provider(Box::new(infrastructure::logging::SystemTimeProvider));
    if installed {
        crate::log_info!(domain::logging::LogComponent::Presentation("Initialize"), "chart engine ready");
    }
    installed
}
