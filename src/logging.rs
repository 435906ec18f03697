use serde::Deserialize;
use std::cmp::Ordering;

pub const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl PartialOrd for LogLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        fn rank(level: LogLevel) -> u8 {
            match level {
                LogLevel::Debug => 0,
                LogLevel::Info => 1,
                LogLevel::Warn => 2,
                LogLevel::Error => 3,
            }
        }

        rank(*self).cmp(&rank(*other))
    }
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Emits one JSON object per event, dropping anything below `min_level`.
#[derive(Clone, Copy, Debug)]
pub struct Logger {
    min_level: LogLevel,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_LEVEL)
    }
}

impl Logger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    pub fn log_event(&self, level: LogLevel, event: &str, fields: serde_json::Value) {
        if !self.enabled(level) {
            return;
        }

        let line = format_event(now_unix_millis(), level, event, fields);
        write_line(level, &line);
    }

    pub fn debug(&self, event: &str, fields: serde_json::Value) {
        self.log_event(LogLevel::Debug, event, fields);
    }

    pub fn info(&self, event: &str, fields: serde_json::Value) {
        self.log_event(LogLevel::Info, event, fields);
    }

    pub fn warn(&self, event: &str, fields: serde_json::Value) {
        self.log_event(LogLevel::Warn, event, fields);
    }

    pub fn error(&self, event: &str, fields: serde_json::Value) {
        self.log_event(LogLevel::Error, event, fields);
    }
}

pub fn format_event(ts: u64, level: LogLevel, event: &str, fields: serde_json::Value) -> String {
    let mut payload = serde_json::Map::new();
    payload.insert(
        "ts".to_string(),
        serde_json::Value::Number(serde_json::Number::from(ts)),
    );
    payload.insert("level".to_string(), serde_json::Value::String(level.as_str().to_string()));
    payload.insert("event".to_string(), serde_json::Value::String(event.to_string()));

    if let serde_json::Value::Object(extra) = fields {
        for (key, value) in extra {
            payload.insert(key, value);
        }
    }

    serde_json::Value::Object(payload).to_string()
}

#[cfg(target_arch = "wasm32")]
fn now_unix_millis() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(not(target_arch = "wasm32"))]
fn now_unix_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(target_arch = "wasm32")]
fn write_line(level: LogLevel, line: &str) {
    let value = wasm_bindgen::JsValue::from_str(line);
    match level {
        LogLevel::Debug => web_sys::console::debug_1(&value),
        LogLevel::Info => web_sys::console::log_1(&value),
        LogLevel::Warn => web_sys::console::warn_1(&value),
        LogLevel::Error => web_sys::console::error_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_line(level: LogLevel, line: &str) {
    if level >= LogLevel::Warn {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_fields_are_merged_after_the_envelope() {
        let line = format_event(
            1_700_000_000_000,
            LogLevel::Warn,
            "navbar_missing",
            json!({ "selector": "#navbar" }),
        );
        let parsed: serde_json::Value = serde_json::from_str(&line).expect("log line is JSON");

        assert_eq!(parsed["ts"], 1_700_000_000_000u64);
        assert_eq!(parsed["level"], "warn");
        assert_eq!(parsed["event"], "navbar_missing");
        assert_eq!(parsed["selector"], "#navbar");
    }

    #[test]
    fn non_object_fields_are_ignored() {
        let line = format_event(1, LogLevel::Info, "site_initialized", json!(null));
        let parsed: serde_json::Value = serde_json::from_str(&line).expect("log line is JSON");

        assert_eq!(parsed.as_object().map(|object| object.len()), Some(3));
    }

    #[test]
    fn logger_filters_below_minimum_level() {
        let logger = Logger::new(LogLevel::Warn);

        assert!(!logger.enabled(LogLevel::Info));
        assert!(logger.enabled(LogLevel::Warn));
        assert!(logger.enabled(LogLevel::Error));
        assert!(Logger::default().enabled(LogLevel::Info));
        assert!(!Logger::default().enabled(LogLevel::Debug));
    }
}
