//! Runtime configuration.
//!
//! Defaults match the stock Small Basic window and timings. A config can be
//! loaded from JSON and then overridden from `SMALLBASIC_*` environment
//! variables.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RuntimeError, RuntimeResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub background_color: String,
    pub pen_color: String,
    pub brush_color: String,
    pub pen_width: f64,
    pub font_name: String,
    pub font_size: f64,
    pub can_resize: bool,
    pub timer_interval_ms: u64,
    pub sleep_poll_ms: u64,
    pub system_sound_wait_ms: u64,
    pub http_timeout_ms: u64,
    pub user_agent: String,
    /// Program argument vector; element 0 is the program itself
    pub args: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            window_title: "Graphics Window".to_string(),
            window_width: 800,
            window_height: 600,
            background_color: "White".to_string(),
            pen_color: "Black".to_string(),
            brush_color: "Black".to_string(),
            pen_width: 1.0,
            font_name: "Arial".to_string(),
            font_size: 12.0,
            can_resize: false,
            timer_interval_ms: 100,
            sleep_poll_ms: 100,
            system_sound_wait_ms: 1000,
            http_timeout_ms: 30_000,
            user_agent: concat!("smallbasic/", env!("CARGO_PKG_VERSION")).to_string(),
            args: std::env::args().collect(),
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by the process environment
    pub fn from_env() -> RuntimeResult<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> RuntimeResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&text).map_err(|e| {
            RuntimeError::invalid_argument(format!(
                "config {}: {e}",
                path.as_ref().display()
            ))
        })
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Apply overrides looked up through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> RuntimeResult<()> {
        fn set<T: FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            key: &str,
            field: &mut T,
        ) -> RuntimeResult<()> {
            if let Some(raw) = lookup(key) {
                *field = raw.trim().parse().map_err(|_| {
                    RuntimeError::invalid_argument(format!("{key}={raw} is malformed"))
                })?;
                tracing::debug!(key, "Applied environment override");
            }
            Ok(())
        }

        set(&lookup, "SMALLBASIC_WINDOW_TITLE", &mut self.window_title)?;
        set(&lookup, "SMALLBASIC_WINDOW_WIDTH", &mut self.window_width)?;
        set(&lookup, "SMALLBASIC_WINDOW_HEIGHT", &mut self.window_height)?;
        set(&lookup, "SMALLBASIC_BACKGROUND_COLOR", &mut self.background_color)?;
        set(&lookup, "SMALLBASIC_PEN_COLOR", &mut self.pen_color)?;
        set(&lookup, "SMALLBASIC_BRUSH_COLOR", &mut self.brush_color)?;
        set(&lookup, "SMALLBASIC_FONT_NAME", &mut self.font_name)?;
        set(&lookup, "SMALLBASIC_FONT_SIZE", &mut self.font_size)?;
        set(&lookup, "SMALLBASIC_CAN_RESIZE", &mut self.can_resize)?;
        set(&lookup, "SMALLBASIC_TIMER_INTERVAL_MS", &mut self.timer_interval_ms)?;
        set(&lookup, "SMALLBASIC_SLEEP_POLL_MS", &mut self.sleep_poll_ms)?;
        set(&lookup, "SMALLBASIC_SYSTEM_SOUND_WAIT_MS", &mut self.system_sound_wait_ms)?;
        set(&lookup, "SMALLBASIC_HTTP_TIMEOUT_MS", &mut self.http_timeout_ms)?;
        set(&lookup, "SMALLBASIC_USER_AGENT", &mut self.user_agent)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!((config.window_width, config.window_height), (800, 600));
        assert_eq!(config.background_color, "White");
        assert_eq!(config.timer_interval_ms, 100);
    }

    #[test]
    fn test_apply_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SMALLBASIC_WINDOW_WIDTH", "1024"),
            ("SMALLBASIC_PEN_COLOR", "Red"),
            ("SMALLBASIC_CAN_RESIZE", "true"),
        ]
        .into_iter()
        .collect();
        let mut config = RuntimeConfig::default();
        config
            .apply_env(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.window_width, 1024);
        assert_eq!(config.pen_color, "Red");
        assert!(config.can_resize);
    }

    #[test]
    fn test_malformed_override_is_rejected() {
        let mut config = RuntimeConfig::default();
        let err = config
            .apply_env(|k| (k == "SMALLBASIC_HTTP_TIMEOUT_MS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    #[serial]
    fn test_from_env() {
        // SAFETY: serialized with every other test touching the environment
        unsafe { std::env::set_var("SMALLBASIC_WINDOW_TITLE", "From Env") };
        let config = RuntimeConfig::from_env().unwrap();
        unsafe { std::env::remove_var("SMALLBASIC_WINDOW_TITLE") };
        assert_eq!(config.window_title, "From Env");
    }

    #[test]
    fn test_json_round_trip_with_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "window_width": 320, "font_name": "Consolas" }"#).unwrap();
        let config = RuntimeConfig::from_json_file(&path).unwrap();
        assert_eq!(config.window_width, 320);
        assert_eq!(config.font_name, "Consolas");
        assert_eq!(config.window_height, 600);

        let again: RuntimeConfig = serde_json::from_str(&config.to_json()).unwrap();
        assert_eq!(again, config);
    }
}
