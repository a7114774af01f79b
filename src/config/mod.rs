//! Configuration management
//!
//! Built from defaults and overridden by CLI arguments and environment
//! variables. There is no configuration file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub mod types;

pub use types::{InputConfig, MotionConfig, SessionConfig, TriggerConfig};

use crate::session::KeyModifiers;

/// Largest accepted `max_speed` (pixels per tick)
pub const MAX_SPEED_LIMIT: u32 = 10_000;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Pointer motion tuning
    #[serde(default)]
    pub motion: MotionConfig,
    /// Key bindings and layout
    pub input: InputConfig,
    /// Mode switching keys
    pub trigger: TriggerConfig,
    /// Session behavior
    #[serde(default = "default_session")]
    pub session: SessionConfig,
}

fn default_session() -> SessionConfig {
    SessionConfig {
        idle_timeout_secs: 0,
    }
}

/// Values supplied on the command line; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Dead zone before motion starts (ms)
    pub initial_delay_ms: Option<u64>,
    /// Auto-repeat debounce window (ms)
    pub debounce_ms: Option<u64>,
    /// Tick interval while moving (ms)
    pub tick_interval_ms: Option<u64>,
    /// Maximum speed (pixels per tick)
    pub max_speed: Option<u32>,
    /// Keyboard layout
    pub keyboard_layout: Option<String>,
    /// Up key
    pub up: Option<String>,
    /// Down key
    pub down: Option<String>,
    /// Left key
    pub left: Option<String>,
    /// Right key
    pub right: Option<String>,
    /// Left click key
    pub left_click: Option<String>,
    /// Middle click key
    pub middle_click: Option<String>,
    /// Right click key
    pub right_click: Option<String>,
    /// Trigger key
    pub trigger_key: Option<String>,
    /// Leave key
    pub leave_key: Option<String>,
    /// Idle timeout (seconds, 0 = never)
    pub idle_timeout_secs: Option<u64>,
}

impl Config {
    /// Create default configuration
    pub fn default_config() -> Self {
        Config {
            motion: MotionConfig::default(),
            input: InputConfig {
                keyboard_layout: "us".to_string(),
                bindings: Default::default(),
            },
            trigger: TriggerConfig {
                key: "Alt_L".to_string(),
                modifiers: vec!["ctrl".to_string(), "super".to_string()],
                leave_key: "Escape".to_string(),
            },
            session: default_session(),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.motion.tick_interval_ms == 0 {
            anyhow::bail!("tick_interval_ms must be greater than 0");
        }

        if self.motion.max_speed == 0 {
            anyhow::bail!("max_speed must be at least 1");
        }

        if self.motion.max_speed > MAX_SPEED_LIMIT {
            anyhow::bail!(
                "max_speed must be at most {} (got {})",
                MAX_SPEED_LIMIT,
                self.motion.max_speed
            );
        }

        if !self.motion.acceleration_base.is_finite() || self.motion.acceleration_base < 0.0 {
            anyhow::bail!(
                "Invalid acceleration_base: {}",
                self.motion.acceleration_base
            );
        }

        if !self.motion.acceleration_rate.is_finite() || self.motion.acceleration_rate < 0.0 {
            anyhow::bail!(
                "Invalid acceleration_rate: {}",
                self.motion.acceleration_rate
            );
        }

        match self.input.keyboard_layout.as_str() {
            "us" | "de" | "fr" => {}
            _ => anyhow::bail!("Invalid keyboard layout: {}", self.input.keyboard_layout),
        }

        let bindings = &self.input.bindings;
        for (name, keysym) in [
            ("up", &bindings.up),
            ("down", &bindings.down),
            ("left", &bindings.left),
            ("right", &bindings.right),
            ("left_click", &bindings.left_click),
            ("middle_click", &bindings.middle_click),
            ("right_click", &bindings.right_click),
        ] {
            if keysym.trim().is_empty() {
                anyhow::bail!("Key binding '{}' is empty", name);
            }
        }

        KeyModifiers::parse(&self.trigger.modifiers).context("Invalid trigger modifiers")?;

        if self.trigger.key == self.trigger.leave_key {
            anyhow::bail!(
                "Trigger key and leave key must differ (both are {})",
                self.trigger.key
            );
        }

        Ok(())
    }

    /// Override config with CLI arguments
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        let ConfigOverrides {
            initial_delay_ms,
            debounce_ms,
            tick_interval_ms,
            max_speed,
            keyboard_layout,
            up,
            down,
            left,
            right,
            left_click,
            middle_click,
            right_click,
            trigger_key,
            leave_key,
            idle_timeout_secs,
        } = overrides;

        if let Some(v) = initial_delay_ms {
            self.motion.initial_delay_ms = v;
        }
        if let Some(v) = debounce_ms {
            self.motion.debounce_ms = v;
        }
        if let Some(v) = tick_interval_ms {
            self.motion.tick_interval_ms = v;
        }
        if let Some(v) = max_speed {
            self.motion.max_speed = v;
        }
        if let Some(v) = keyboard_layout {
            self.input.keyboard_layout = v;
        }

        let bindings = &mut self.input.bindings;
        for (slot, value) in [
            (&mut bindings.up, up),
            (&mut bindings.down, down),
            (&mut bindings.left, left),
            (&mut bindings.right, right),
            (&mut bindings.left_click, left_click),
            (&mut bindings.middle_click, middle_click),
            (&mut bindings.right_click, right_click),
        ] {
            if let Some(keysym) = value {
                *slot = keysym;
            }
        }

        if let Some(v) = trigger_key {
            self.trigger.key = v;
        }
        if let Some(v) = leave_key {
            self.trigger.leave_key = v;
        }
        if let Some(v) = idle_timeout_secs {
            self.session.idle_timeout_secs = v;
        }

        self
    }

    /// Effective configuration as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_config();
        assert_eq!(config.motion.initial_delay_ms, 200);
        assert_eq!(config.motion.debounce_ms, 10);
        assert_eq!(config.motion.tick_interval_ms, 20);
        assert_eq!(config.motion.max_speed, 32);
        assert_eq!(config.input.bindings.up, "k");
        assert_eq!(config.trigger.key, "Alt_L");
        assert_eq!(config.trigger.leave_key, "Escape");
        assert!(config.session.idle_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_tick() {
        let mut config = Config::default_config();
        config.motion.tick_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_speed() {
        let mut config = Config::default_config();
        config.motion.max_speed = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_speed_limit() {
        let mut config = Config::default_config();
        config.motion.max_speed = MAX_SPEED_LIMIT;
        assert!(config.validate().is_ok());

        config.motion.max_speed = 3_000_000_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_layout() {
        let mut config = Config::default_config();
        config.input.keyboard_layout = "dvorak-ish".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_modifier() {
        let mut config = Config::default_config();
        config.trigger.modifiers.push("hyper".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_same_trigger_and_leave() {
        let mut config = Config::default_config();
        config.trigger.leave_key = "Alt_L".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_binding() {
        let mut config = Config::default_config();
        config.input.bindings.right_click = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::default_config().with_overrides(ConfigOverrides {
            max_speed: Some(16),
            up: Some("Up".to_string()),
            idle_timeout_secs: Some(60),
            ..Default::default()
        });

        assert_eq!(config.motion.max_speed, 16);
        assert_eq!(config.input.bindings.up, "Up");
        assert_eq!(config.input.bindings.down, "j");
        assert_eq!(
            config.session.idle_timeout(),
            Some(std::time::Duration::from_secs(60))
        );
    }

    #[test]
    fn test_json_roundtrip_of_defaults() {
        let config = Config::default_config();
        let json = config.to_json().unwrap();
        assert!(json.contains("\"initial_delay_ms\": 200"));

        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_motion_section_defaults_when_missing() {
        let json = r#"{
            "input": { "keyboard_layout": "us" },
            "trigger": { "key": "Alt_L", "modifiers": ["ctrl"], "leave_key": "Escape" }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.motion, MotionConfig::default());
        assert_eq!(config.input.bindings.left_click, "f");
    }
}
