// Speed mode selection from the two front buttons

use serde::{Deserialize, Serialize};

use crate::config::LoopConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedMode {
    #[default]
    Normal,
    Slow,
    Turbo,
}

impl SpeedMode {
    /// Resolve the mode from the held front buttons.
    /// Turbo wins when both are held.
    pub fn select(slow_held: bool, turbo_held: bool) -> Self {
        match (slow_held, turbo_held) {
            (_, true) => SpeedMode::Turbo,
            (true, false) => SpeedMode::Slow,
            (false, false) => SpeedMode::Normal,
        }
    }

    /// Divisor applied to stick values before mixing
    pub fn damping(self, config: &LoopConfig) -> f32 {
        match self {
            SpeedMode::Normal => config.normal_damping,
            SpeedMode::Slow => config.slow_damping,
            SpeedMode::Turbo => config.turbo_damping,
        }
    }
}
