use std::sync::Mutex;

use crate::domain::logging::{LogEntry, LogLevel, Logger, TimeProvider};

/// Logger writing to the browser console, stderr on native targets.
pub struct ConsoleLogger {
    min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }

    pub fn new_production() -> Self {
        Self::new(LogLevel::Info)
    }

    pub fn new_development() -> Self {
        Self::new(LogLevel::Debug)
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, entry: LogEntry) {
        if entry.level < self.min_level {
            return;
        }
        let line = entry.render();

        #[cfg(target_arch = "wasm32")]
        {
            let value = wasm_bindgen::JsValue::from_str(&line);
            match entry.level {
                LogLevel::Trace | LogLevel::Debug => web_sys::console::debug_1(&value),
                LogLevel::Info => web_sys::console::info_1(&value),
                LogLevel::Warn => web_sys::console::warn_1(&value),
                LogLevel::Error => web_sys::console::error_1(&value),
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        eprintln!("{}", line);
    }
}

/// Keeps entries in memory, for headless hosts and tests.
#[derive(Default)]
pub struct MemoryLogger {
    min_level: Option<LogLevel>,
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_level(min_level: LogLevel) -> Self {
        Self {
            min_level: Some(min_level),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|entry| entry.message).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl Logger for MemoryLogger {
    fn log(&self, entry: LogEntry) {
        if self.min_level.is_some_and(|min| entry.level < min) {
            return;
        }
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }
}

/// Wall clock from `Date.now()`, milliseconds.
#[cfg(target_arch = "wasm32")]
pub struct BrowserTimeProvider;

#[cfg(target_arch = "wasm32")]
impl TimeProvider for BrowserTimeProvider {
    fn current_timestamp(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    fn format_timestamp(&self, timestamp: u64) -> String {
        let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp as f64));
        format!(
            "{:02}:{:02}:{:02}.{:03}",
            date.get_hours(),
            date.get_minutes(),
            date.get_seconds(),
            date.get_milliseconds()
        )
    }
}

/// Wall clock from `std::time`, milliseconds.
#[cfg(not(target_arch = "wasm32"))]
pub struct SystemTimeProvider;

#[cfg(not(target_arch = "wasm32"))]
impl TimeProvider for SystemTimeProvider {
    fn current_timestamp(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }

    fn format_timestamp(&self, timestamp: u64) -> String {
        chrono::DateTime::from_timestamp_millis(timestamp as i64)
            .map(|dt| dt.format("%H:%M:%S%.3f").to_string())
            .unwrap_or_else(|| timestamp.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::logging::LogComponent;

    #[test]
    fn memory_logger_filters_by_level() {
        let logger = MemoryLogger::with_min_level(LogLevel::Warn);
        logger.info(LogComponent::Infrastructure("Wire"), "ignored");
        logger.warn(LogComponent::Infrastructure("Wire"), "kept");
        assert_eq!(logger.messages(), vec!["kept".to_string()]);
    }
}
