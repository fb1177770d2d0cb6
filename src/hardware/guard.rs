// Scoped ownership of the robot hardware for the life of the control loop.
// Leaving motors powered after a fault is the main hazard, so the stop /
// LEDs off / shutdown sequence runs exactly once whichever way the loop exits.

use std::ops::{Deref, DerefMut};

use tracing::{info, warn};

use super::{HardwareError, RobotHardware};

pub struct HardwareGuard<'a, H: RobotHardware + ?Sized> {
    hardware: &'a mut H,
    released: bool,
}

impl<'a, H: RobotHardware + ?Sized> HardwareGuard<'a, H> {
    pub fn new(hardware: &'a mut H) -> Self {
        Self {
            hardware,
            released: false,
        }
    }

    /// Run the cleanup sequence now and report the first failure
    pub fn release(mut self) -> Result<(), HardwareError> {
        self.cleanup()
    }

    /// Every step is attempted even if an earlier one fails
    fn cleanup(&mut self) -> Result<(), HardwareError> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        info!("Stopping motors and releasing hardware");

        let steps = [
            self.hardware.set_motors_power(0, 0),
            self.hardware
                .set_leds_all_off()
                .and_then(|_| self.hardware.show_leds()),
            self.hardware.shutdown_hardware(),
        ];

        let mut first_error = None;
        for result in steps {
            if let Err(e) = result {
                warn!("Cleanup step failed: {}", e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<H: RobotHardware + ?Sized> Deref for HardwareGuard<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        &*self.hardware
    }
}

impl<H: RobotHardware + ?Sized> DerefMut for HardwareGuard<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        &mut *self.hardware
    }
}

impl<H: RobotHardware + ?Sized> Drop for HardwareGuard<'_, H> {
    fn drop(&mut self) {
        // Reached without release() on panic or early return
        if let Err(e) = self.cleanup() {
            warn!("Failed to release hardware on drop: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::SimulatedRobot;
    use crate::messages::Rgb;

    #[test]
    fn test_release_stops_everything() {
        let mut robot = SimulatedRobot::new("test", 8, 7.4);
        {
            let mut guard = HardwareGuard::new(&mut robot);
            guard.set_motors_power(50, -50).unwrap();
            guard.set_all_leds_color(Rgb::new(1, 2, 3)).unwrap();
            guard.release().unwrap();
        }
        assert_eq!(robot.motors(), (0, 0));
        assert!(robot.shown_leds().iter().all(|&c| c == Rgb::OFF));
        assert_eq!(robot.shutdown_count(), 1);
    }

    #[test]
    fn test_drop_cleans_up_once() {
        let mut robot = SimulatedRobot::new("test", 8, 7.4);
        {
            let mut guard = HardwareGuard::new(&mut robot);
            guard.set_motors_power(80, 80).unwrap();
        }
        assert_eq!(robot.motors(), (0, 0));
        assert_eq!(robot.shutdown_count(), 1);
    }

    #[test]
    fn test_cleanup_runs_on_panic() {
        let mut robot = SimulatedRobot::new("test", 8, 7.4);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut guard = HardwareGuard::new(&mut robot);
            guard.set_motors_power(100, 100).unwrap();
            panic!("fault inside a cycle");
        }));
        assert!(result.is_err());
        assert_eq!(robot.motors(), (0, 0));
        assert_eq!(robot.shutdown_count(), 1);
    }
}
