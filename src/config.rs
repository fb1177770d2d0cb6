// Loop timing, drive tuning, battery and LED constants
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::messages::Rgb;

// Runtime loop frequency
pub const LOOP_HZ: u64 = 50;

// Largest change of applied motor power per cycle (percent points)
pub const MAX_CHANGE_RATE: f32 = 20.0;

// Damping divisors applied to stick values before mixing
pub const NORMAL_DAMPING: f32 = 1.3;
pub const SLOW_DAMPING: f32 = 3.0;
pub const TURBO_DAMPING: f32 = 1.0;

// Battery voltage range mapped to 0-100%
pub const BATTERY_MIN_V: f32 = 6.5;
pub const BATTERY_MAX_V: f32 = 8.0;

// Only sample the battery this many cycles apart (and only while idle)
pub const BATTERY_SAMPLE_INTERVAL: u32 = 20;

// Samples averaged before the battery colour is updated
pub const BATTERY_WINDOW: u32 = 10;

// LED animation advances every N control cycles
pub const LED_UPDATE_INTERVAL: u32 = 2;

// Colours
pub const STARTUP_COLOR: Rgb = Rgb::new(0, 255, 255); // until first battery reading
pub const SLOW_COLOR: Rgb = Rgb::new(0, 0, 100);
pub const TURBO_COLOR: Rgb = Rgb::new(100, 0, 0);
pub const CONNECTED_COLOR: Rgb = Rgb::new(0, 0, 255);
pub const READY_COLOR: Rgb = Rgb::new(0, 255, 0);
pub const NOT_DETECTED_COLOR: Rgb = Rgb::new(255, 0, 0);

// Green "ready" display after the controller connects
pub const READY_HOLD: Duration = Duration::from_secs(1);

// Red flash pattern when no supported controller is found
pub const NOT_DETECTED_FLASHES: u32 = 6;
pub const FLASH_PERIOD: Duration = Duration::from_millis(250);

// Delay between connection status checks while waiting for a controller
pub const CONNECT_POLL: Duration = Duration::from_millis(100);

/// Error loading or validating a [`LoopConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Tunables for the control loop. Every field falls back to the constants above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Cycle rate; 0 runs unpaced (cycle period set by the controller poll)
    pub loop_hz: u64,
    pub max_change_rate: f32,
    pub normal_damping: f32,
    pub slow_damping: f32,
    pub turbo_damping: f32,
    pub battery_min_v: f32,
    pub battery_max_v: f32,
    pub battery_sample_interval: u32,
    pub battery_window: u32,
    pub led_update_interval: u32,
    pub ready_hold_ms: u64,
    pub flash_period_ms: u64,
    pub connect_poll_ms: u64,
    pub allow_poweroff: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            loop_hz: LOOP_HZ,
            max_change_rate: MAX_CHANGE_RATE,
            normal_damping: NORMAL_DAMPING,
            slow_damping: SLOW_DAMPING,
            turbo_damping: TURBO_DAMPING,
            battery_min_v: BATTERY_MIN_V,
            battery_max_v: BATTERY_MAX_V,
            battery_sample_interval: BATTERY_SAMPLE_INTERVAL,
            battery_window: BATTERY_WINDOW,
            led_update_interval: LED_UPDATE_INTERVAL,
            ready_hold_ms: READY_HOLD.as_millis() as u64,
            flash_period_ms: FLASH_PERIOD.as_millis() as u64,
            connect_poll_ms: CONNECT_POLL.as_millis() as u64,
            allow_poweroff: false,
        }
    }
}

impl LoopConfig {
    /// Load a JSON config file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, divisor) in [
            ("normal_damping", self.normal_damping),
            ("slow_damping", self.slow_damping),
            ("turbo_damping", self.turbo_damping),
        ] {
            if !(divisor > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be positive, got {}",
                    name, divisor
                )));
            }
        }
        if !(self.max_change_rate > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "max_change_rate must be positive, got {}",
                self.max_change_rate
            )));
        }
        if !(self.battery_max_v > self.battery_min_v) {
            return Err(ConfigError::Invalid(format!(
                "battery range {}..{} is empty",
                self.battery_min_v, self.battery_max_v
            )));
        }
        if self.battery_sample_interval == 0
            || self.battery_window == 0
            || self.led_update_interval == 0
        {
            return Err(ConfigError::Invalid(
                "intervals and battery window must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Target period of one control cycle, `None` when unpaced
    pub fn cycle_period(&self) -> Option<Duration> {
        (self.loop_hz > 0).then(|| Duration::from_micros(1_000_000 / self.loop_hz))
    }

    pub fn ready_hold(&self) -> Duration {
        Duration::from_millis(self.ready_hold_ms)
    }

    pub fn flash_period(&self) -> Duration {
        Duration::from_millis(self.flash_period_ms)
    }

    pub fn connect_poll(&self) -> Duration {
        Duration::from_millis(self.connect_poll_ms)
    }
}
