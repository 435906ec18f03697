use crate::{
    error::SiteError,
    logging::{LogLevel, DEFAULT_LOG_LEVEL},
};
use serde::Deserialize;

pub const CONFIG_ELEMENT_ID: &str = "site-config";

pub const DEFAULT_THEME_STORAGE_KEY: &str = "theme";
pub const DEFAULT_NAVBAR_CLEARANCE: f64 = 70.0;
pub const DEFAULT_SECTION_LOOKAHEAD: f64 = 150.0;
pub const DEFAULT_HOME_THRESHOLD: f64 = 200.0;
pub const DEFAULT_DESKTOP_BREAKPOINT: f64 = 768.0;
pub const DEFAULT_NAVBAR_THROTTLE_MS: u32 = 16;
pub const DEFAULT_SECTION_THROTTLE_MS: u32 = 50;
pub const DEFAULT_SECTION_SETTLE_MS: u32 = 100;
pub const DEFAULT_VIEWER_INITIAL_DELAY_MS: u32 = 1_000;
pub const DEFAULT_VIEWER_RETHEME_DELAY_MS: u32 = 100;
pub const DEFAULT_VIEWER_READY_EVENT: &str = "load-complete";
pub const DEFAULT_SERVICE_WORKER_PATH: &str = "/sw.js";

const OFFSET_BOUNDS: (f64, f64) = (0.0, 2_000.0);
const BREAKPOINT_BOUNDS: (f64, f64) = (320.0, 4_096.0);
const THROTTLE_MS_BOUNDS: (u32, u32) = (1, 1_000);
const DELAY_MS_BOUNDS: (u32, u32) = (0, 10_000);

/// Runtime constants for the page. Every field has a default; a page can override any of
/// them with a JSON block in `<script type="application/json" id="site-config">`.
#[derive(Clone, Debug, PartialEq)]
pub struct SiteConfig {
    pub theme_storage_key: String,
    pub navbar_clearance: f64,
    pub section_lookahead: f64,
    pub home_threshold: f64,
    pub desktop_breakpoint: f64,
    pub navbar_throttle_ms: u32,
    pub section_throttle_ms: u32,
    pub section_settle_ms: u32,
    pub viewer_initial_delay_ms: u32,
    pub viewer_retheme_delay_ms: u32,
    pub viewer_ready_event: String,
    pub service_worker_path: Option<String>,
    pub log_level: LogLevel,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            theme_storage_key: DEFAULT_THEME_STORAGE_KEY.to_string(),
            navbar_clearance: DEFAULT_NAVBAR_CLEARANCE,
            section_lookahead: DEFAULT_SECTION_LOOKAHEAD,
            home_threshold: DEFAULT_HOME_THRESHOLD,
            desktop_breakpoint: DEFAULT_DESKTOP_BREAKPOINT,
            navbar_throttle_ms: DEFAULT_NAVBAR_THROTTLE_MS,
            section_throttle_ms: DEFAULT_SECTION_THROTTLE_MS,
            section_settle_ms: DEFAULT_SECTION_SETTLE_MS,
            viewer_initial_delay_ms: DEFAULT_VIEWER_INITIAL_DELAY_MS,
            viewer_retheme_delay_ms: DEFAULT_VIEWER_RETHEME_DELAY_MS,
            viewer_ready_event: DEFAULT_VIEWER_READY_EVENT.to_string(),
            service_worker_path: Some(DEFAULT_SERVICE_WORKER_PATH.to_string()),
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigOverrides {
    theme_storage_key: Option<String>,
    navbar_clearance: Option<f64>,
    section_lookahead: Option<f64>,
    home_threshold: Option<f64>,
    desktop_breakpoint: Option<f64>,
    navbar_throttle_ms: Option<u32>,
    section_throttle_ms: Option<u32>,
    section_settle_ms: Option<u32>,
    viewer_initial_delay_ms: Option<u32>,
    viewer_retheme_delay_ms: Option<u32>,
    viewer_ready_event: Option<String>,
    service_worker_path: Option<String>,
    log_level: Option<LogLevel>,
}

impl SiteConfig {
    /// Parses overrides from a JSON object. Blank input yields the defaults; numbers
    /// outside their bounds are ignored field by field.
    pub fn from_json(raw: &str) -> Result<Self, SiteError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        let overrides: ConfigOverrides = serde_json::from_str(raw)?;
        Ok(Self::default().with_overrides(overrides))
    }

    fn with_overrides(self, overrides: ConfigOverrides) -> Self {
        Self {
            theme_storage_key: non_empty(overrides.theme_storage_key)
                .unwrap_or(self.theme_storage_key),
            navbar_clearance: within_f64(overrides.navbar_clearance, OFFSET_BOUNDS)
                .unwrap_or(self.navbar_clearance),
            section_lookahead: within_f64(overrides.section_lookahead, OFFSET_BOUNDS)
                .unwrap_or(self.section_lookahead),
            home_threshold: within_f64(overrides.home_threshold, OFFSET_BOUNDS)
                .unwrap_or(self.home_threshold),
            desktop_breakpoint: within_f64(overrides.desktop_breakpoint, BREAKPOINT_BOUNDS)
                .unwrap_or(self.desktop_breakpoint),
            navbar_throttle_ms: within_u32(overrides.navbar_throttle_ms, THROTTLE_MS_BOUNDS)
                .unwrap_or(self.navbar_throttle_ms),
            section_throttle_ms: within_u32(overrides.section_throttle_ms, THROTTLE_MS_BOUNDS)
                .unwrap_or(self.section_throttle_ms),
            section_settle_ms: within_u32(overrides.section_settle_ms, DELAY_MS_BOUNDS)
                .unwrap_or(self.section_settle_ms),
            viewer_initial_delay_ms: within_u32(overrides.viewer_initial_delay_ms, DELAY_MS_BOUNDS)
                .unwrap_or(self.viewer_initial_delay_ms),
            viewer_retheme_delay_ms: within_u32(overrides.viewer_retheme_delay_ms, DELAY_MS_BOUNDS)
                .unwrap_or(self.viewer_retheme_delay_ms),
            viewer_ready_event: non_empty(overrides.viewer_ready_event)
                .unwrap_or(self.viewer_ready_event),
            // An explicit empty string turns worker registration off.
            service_worker_path: match overrides.service_worker_path {
                Some(path) if path.trim().is_empty() => None,
                Some(path) => Some(path.trim().to_string()),
                None => self.service_worker_path,
            },
            log_level: overrides.log_level.unwrap_or(self.log_level),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn within_f64(value: Option<f64>, bounds: (f64, f64)) -> Option<f64> {
    value.filter(|value| (bounds.0..=bounds.1).contains(value))
}

fn within_u32(value: Option<u32>, bounds: (u32, u32)) -> Option<u32> {
    value.filter(|value| (bounds.0..=bounds.1).contains(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_config_uses_defaults() {
        let config = SiteConfig::from_json("  \n").expect("blank config is valid");

        assert_eq!(config, SiteConfig::default());
        assert_eq!(config.theme_storage_key, "theme");
        assert_eq!(config.service_worker_path.as_deref(), Some("/sw.js"));
    }

    #[test]
    fn in_bounds_overrides_are_applied() {
        let config = SiteConfig::from_json(
            r#"{ "navbar_clearance": 90, "desktop_breakpoint": 1024, "log_level": "debug" }"#,
        )
        .expect("valid config");

        assert_eq!(config.navbar_clearance, 90.0);
        assert_eq!(config.desktop_breakpoint, 1024.0);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.section_lookahead, DEFAULT_SECTION_LOOKAHEAD);
    }

    #[test]
    fn out_of_bounds_overrides_fall_back_to_defaults() {
        let config = SiteConfig::from_json(
            r#"{ "navbar_throttle_ms": 0, "desktop_breakpoint": 10, "viewer_initial_delay_ms": 60000 }"#,
        )
        .expect("valid config");

        assert_eq!(config.navbar_throttle_ms, DEFAULT_NAVBAR_THROTTLE_MS);
        assert_eq!(config.desktop_breakpoint, DEFAULT_DESKTOP_BREAKPOINT);
        assert_eq!(config.viewer_initial_delay_ms, DEFAULT_VIEWER_INITIAL_DELAY_MS);
    }

    #[test]
    fn empty_service_worker_path_disables_registration() {
        let config = SiteConfig::from_json(r#"{ "service_worker_path": "" }"#).expect("valid config");

        assert_eq!(config.service_worker_path, None);
    }

    #[test]
    fn blank_storage_key_is_ignored() {
        let config = SiteConfig::from_json(r#"{ "theme_storage_key": "   " }"#).expect("valid config");

        assert_eq!(config.theme_storage_key, DEFAULT_THEME_STORAGE_KEY);
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(matches!(
            SiteConfig::from_json(r#"{ "navbar_clearance": "far" }"#),
            Err(SiteError::Config(_))
        ));
    }
}
