// In-memory robot used when no physical hardware is attached and in tests.
// Motor commands integrate into fake encoder counts; LEDs keep a staged and a
// shown buffer so callers can check what is actually displayed.

use tracing::{debug, info};

use super::{HardwareError, Result, RobotHardware};
use crate::drive::MAX_POWER;
use crate::messages::Rgb;

pub struct SimulatedRobot {
    name: String,
    battery_voltage: f32,
    motors: (i32, i32),
    encoders: [i64; 2],
    staged: Vec<Rgb>,
    shown: Vec<Rgb>,
    keep_alive_count: u64,
    shutdown_count: u32,
}

impl SimulatedRobot {
    pub fn new(name: &str, led_count: usize, battery_voltage: f32) -> Self {
        Self {
            name: name.to_string(),
            battery_voltage,
            motors: (0, 0),
            encoders: [0; 2],
            staged: vec![Rgb::OFF; led_count],
            shown: vec![Rgb::OFF; led_count],
            keep_alive_count: 0,
            shutdown_count: 0,
        }
    }

    pub fn set_battery_voltage(&mut self, volts: f32) {
        self.battery_voltage = volts;
    }

    pub fn motors(&self) -> (i32, i32) {
        self.motors
    }

    pub fn shown_leds(&self) -> &[Rgb] {
        &self.shown
    }

    pub fn keep_alive_count(&self) -> u64 {
        self.keep_alive_count
    }

    pub fn shutdown_count(&self) -> u32 {
        self.shutdown_count
    }

    fn check_led(&self, index: usize) -> Result<()> {
        if index >= self.staged.len() {
            return Err(HardwareError::InvalidLed {
                index,
                count: self.staged.len(),
            });
        }
        Ok(())
    }
}

impl RobotHardware for SimulatedRobot {
    fn robot_name(&self) -> String {
        self.name.clone()
    }

    fn set_motors_power(&mut self, left: i32, right: i32) -> Result<()> {
        let max = MAX_POWER as i32;
        if left.abs() > max || right.abs() > max {
            return Err(HardwareError::Command {
                operation: "set_motors_power",
                reason: format!("power ({}, {}) outside -100..=100", left, right),
            });
        }
        debug!("Motors: left={}, right={}", left, right);
        self.motors = (left, right);
        self.encoders[0] += left as i64;
        self.encoders[1] += right as i64;
        Ok(())
    }

    fn battery_voltage(&mut self) -> Result<f32> {
        Ok(self.battery_voltage)
    }

    fn keep_alive(&mut self) -> Result<()> {
        self.keep_alive_count += 1;
        Ok(())
    }

    fn led_count(&self) -> usize {
        self.staged.len()
    }

    fn set_led_color(&mut self, index: usize, color: Rgb) -> Result<()> {
        self.check_led(index)?;
        self.staged[index] = color;
        Ok(())
    }

    fn show_leds(&mut self) -> Result<()> {
        self.shown.copy_from_slice(&self.staged);
        Ok(())
    }

    fn set_all_leds_color(&mut self, color: Rgb) -> Result<()> {
        self.staged.fill(color);
        self.show_leds()
    }

    fn set_leds_all_off(&mut self) -> Result<()> {
        self.staged.fill(Rgb::OFF);
        Ok(())
    }

    fn shutdown_hardware(&mut self) -> Result<()> {
        info!("{}: motors disabled", self.name);
        self.motors = (0, 0);
        self.staged.fill(Rgb::OFF);
        self.show_leds()?;
        self.shutdown_count += 1;
        Ok(())
    }

    fn encoder_count(&mut self, index: usize) -> Result<i64> {
        self.encoders
            .get(index)
            .copied()
            .ok_or_else(|| HardwareError::Command {
                operation: "encoder_count",
                reason: format!("no encoder {}", index),
            })
    }
}
