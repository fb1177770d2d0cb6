// Per-cycle rate limiting of the applied motor power.
// Sudden reversals stress the gearboxes, so each side may only move by a
// fixed step per control cycle towards its target.

use super::mixer::{MotorTargets, MAX_POWER};

/// Move `prev` towards `target` by at most `max_step`
pub fn limit(prev: f32, target: f32, max_step: f32) -> f32 {
    if (prev - target).abs() > max_step {
        if prev > target {
            prev - max_step
        } else {
            prev + max_step
        }
    } else {
        target
    }
}

/// The power actually applied to each side, carried across cycles
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SmoothedMotorState {
    pub real_left: f32,
    pub real_right: f32,
}

impl SmoothedMotorState {
    /// Step both sides towards `targets`
    pub fn step(&mut self, targets: MotorTargets, max_step: f32) {
        self.real_left = limit(self.real_left, targets.left, max_step).clamp(-MAX_POWER, MAX_POWER);
        self.real_right =
            limit(self.real_right, targets.right, max_step).clamp(-MAX_POWER, MAX_POWER);
    }

    /// Integer command for the hardware, truncated towards zero
    pub fn command(&self) -> (i32, i32) {
        (self.real_left as i32, self.real_right as i32)
    }
}
