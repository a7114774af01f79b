//! Configuration type definitions

use crate::input::{AccelerationCurve, KeyBindings, Millis};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pointer motion tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Hold time before a direction key starts moving the pointer (ms)
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: Millis,

    /// Press-after-release window treated as X auto-repeat (ms)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: Millis,

    /// Tick interval while a direction key is held (ms)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Multiplier of the exponential acceleration term
    #[serde(default = "default_acceleration_base")]
    pub acceleration_base: f64,

    /// Exponential growth rate per millisecond of hold
    #[serde(default = "default_acceleration_rate")]
    pub acceleration_rate: f64,

    /// Maximum pointer speed (pixels per tick)
    #[serde(default = "default_max_speed")]
    pub max_speed: u32,
}

fn default_initial_delay_ms() -> Millis {
    200
}
fn default_debounce_ms() -> Millis {
    10
}
fn default_tick_interval_ms() -> u64 {
    20
}
fn default_acceleration_base() -> f64 {
    0.2
}
fn default_acceleration_rate() -> f64 {
    0.005
}
fn default_max_speed() -> u32 {
    32
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            debounce_ms: default_debounce_ms(),
            tick_interval_ms: default_tick_interval_ms(),
            acceleration_base: default_acceleration_base(),
            acceleration_rate: default_acceleration_rate(),
            max_speed: default_max_speed(),
        }
    }
}

impl MotionConfig {
    /// Acceleration curve described by this configuration
    pub fn curve(&self) -> AccelerationCurve {
        AccelerationCurve {
            initial_delay_ms: self.initial_delay_ms,
            base: self.acceleration_base,
            rate: self.acceleration_rate,
            max_speed: self.max_speed,
        }
    }

    /// Tick interval as a duration
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Key binding configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Keyboard layout for the built-in keysym table ("us", "de", "fr")
    pub keyboard_layout: String,

    /// Keysyms of the seven mouse-mode keys
    #[serde(default)]
    pub bindings: KeyBindings,
}

/// Mode switching keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Key whose release (with the modifiers held) enters mouse mode
    pub key: String,

    /// Modifiers of the trigger combination ("shift", "ctrl", "alt", "super")
    pub modifiers: Vec<String>,

    /// Key whose release leaves mouse mode
    pub leave_key: String,
}

/// Mouse-mode session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Leave mouse mode after this many seconds without input (0 = never)
    #[serde(default)]
    pub idle_timeout_secs: u64,
}

impl SessionConfig {
    /// Idle timeout, `None` when disabled
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }
}
