// Value types exchanged between the controller, the runtime and the hardware

use std::fmt;

use serde::{Deserialize, Serialize};

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Multiply every channel by `factor`, saturating at 0..=255
    pub fn scaled(self, factor: f32) -> Self {
        let channel = |c: u8| (c as f32 * factor).clamp(0.0, 255.0) as u8;
        Self::new(channel(self.r), channel(self.g), channel(self.b))
    }
}

/// Input from the dual-analog controller, drained once per cycle.
/// Axis values are normalised to [-1, 1]; buttons carry their held state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputEvent {
    LeftTrigger(f32),
    RightTrigger(f32),
    LeftStick { lr: f32, ud: f32 },
    RightStick { lr: f32, ud: f32 },
    LeftFrontButton(bool),
    RightFrontButton(bool),
    Hat { lr: i8, ud: i8 },
    SquareButton(bool),
    SelectButton(bool),
}

/// Controller initialisation progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connected,
    NotDetected,
    /// Still searching; the payload is the 1-based slot being probed
    WaitingForSlot(u32),
}

impl ConnectionStatus {
    /// Decode the collaborator's integer status (0 connected, <0 not found, >0 slot)
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ConnectionStatus::Connected,
            c if c < 0 => ConnectionStatus::NotDetected,
            c => ConnectionStatus::WaitingForSlot(c as u32),
        }
    }
}

/// Per-cycle drive telemetry, shown by the controller collaborator
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Telemetry {
    pub power: f32,
    pub turn: f32,
    pub angle_deg: f32,
    pub scale_factor: f32,
    pub target_left: f32,
    pub target_right: f32,
    pub real_left: f32,
    pub real_right: f32,
    pub shutdown_flags: [bool; 3],
}

impl fmt::Display for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P:{:.2},T:{:.2},A:{:.2},SF:{:.2},lm:{:.2}/{:.2},rm:{:.2}/{:.2},Shutdown({},{},{})",
            self.power,
            self.turn,
            self.angle_deg,
            self.scale_factor,
            self.target_left,
            self.real_left,
            self.target_right,
            self.real_right,
            self.shutdown_flags[0],
            self.shutdown_flags[1],
            self.shutdown_flags[2],
        )
    }
}
