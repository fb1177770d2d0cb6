// Robot hardware abstraction
//
// Provides:
// - The capability set every supported robot exposes (motors, battery, LEDs, watchdog)
// - A scoped guard that stops and releases the hardware on every exit path
// - An in-memory simulated robot

mod guard;
pub mod sim;

pub use guard::HardwareGuard;
pub use sim::SimulatedRobot;

use crate::messages::Rgb;

/// Error returned by a hardware command
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    #[error("Hardware command {operation} failed: {reason}")]
    Command {
        operation: &'static str,
        reason: String,
    },

    #[error("LED index {index} out of range (strip has {count})")]
    InvalidLed { index: usize, count: usize },
}

pub type Result<T> = std::result::Result<T, HardwareError>;

/// Twin-motor tank-steered robot with a battery monitor and an RGB LED strip.
///
/// Motor power is a percentage of full power in -100..=100; negative runs the
/// motor in reverse.
pub trait RobotHardware {
    fn robot_name(&self) -> String;

    /// Set the power of the left and right motors
    fn set_motors_power(&mut self, left: i32, right: i32) -> Result<()>;

    /// Battery voltage, or 0.0 when the robot cannot measure it
    fn battery_voltage(&mut self) -> Result<f32>;

    /// Watchdog pulse. Robots with a watchdog power the motors off if this
    /// is not called before their timeout.
    fn keep_alive(&mut self) -> Result<()>;

    fn led_count(&self) -> usize;

    /// Stage a colour for one LED; takes effect on [`RobotHardware::show_leds`]
    fn set_led_color(&mut self, index: usize, color: Rgb) -> Result<()>;

    /// Push staged LED colours to the strip
    fn show_leds(&mut self) -> Result<()>;

    /// Set and show every LED in one colour
    fn set_all_leds_color(&mut self, color: Rgb) -> Result<()>;

    /// Stage every LED as off
    fn set_leds_all_off(&mut self) -> Result<()>;

    /// Stop all motors and power down LEDs and anything else that can be
    fn shutdown_hardware(&mut self) -> Result<()>;

    /// Encoder position of a motor. Telemetry only.
    fn encoder_count(&mut self, index: usize) -> Result<i64>;
}
