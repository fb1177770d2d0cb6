// Battery voltage sampling and status colour
//
// Voltage sags under load, so readings are only taken while the sticks are
// centred and no more often than every `sample_interval` cycles. A window of
// readings is averaged before the colour changes.

use tracing::{info, warn};

use crate::config::{LoopConfig, STARTUP_COLOR};
use crate::messages::Rgb;

/// Charge percentage for `voltage` across `min_v..max_v`, clamped to 0..=100
pub fn charge_percent(voltage: f32, min_v: f32, max_v: f32) -> f32 {
    (100.0 * (voltage - min_v) / (max_v - min_v)).clamp(0.0, 100.0)
}

/// Red fades out and green fades in as charge rises
pub fn charge_color(percent: f32) -> Rgb {
    let red = (120.0 - 1.2 * percent).round().clamp(0.0, 255.0) as u8;
    let green = percent.round().clamp(0.0, 255.0) as u8;
    Rgb::new(red, green, 0)
}

pub struct BatteryMonitor {
    min_v: f32,
    max_v: f32,
    sample_interval: u32,
    window: u32,
    cycles_since_sample: u32,
    sum: f32,
    count: u32,
    color: Rgb,
}

impl BatteryMonitor {
    pub fn new(config: &LoopConfig) -> Self {
        Self {
            min_v: config.battery_min_v,
            max_v: config.battery_max_v,
            sample_interval: config.battery_sample_interval,
            window: config.battery_window,
            cycles_since_sample: 0,
            sum: 0.0,
            count: 0,
            color: STARTUP_COLOR,
        }
    }

    /// Current status colour
    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Samples accumulated in the current window
    pub fn pending_samples(&self) -> u32 {
        self.count
    }

    /// Advance one control cycle. Returns true when a reading should be taken now.
    pub fn sample_due(&mut self, power: f32, turn: f32) -> bool {
        self.cycles_since_sample = self.cycles_since_sample.saturating_add(1);
        if self.cycles_since_sample >= self.sample_interval && power == 0.0 && turn == 0.0 {
            self.cycles_since_sample = 0;
            true
        } else {
            false
        }
    }

    /// Add a reading to the window. Returns the new colour once the window completes.
    pub fn sample(&mut self, voltage: f32) -> Option<Rgb> {
        if voltage <= 0.0 {
            warn!("Battery voltage unavailable, keeping colour {:?}", self.color);
            return None;
        }

        self.sum += voltage;
        self.count += 1;
        if self.count < self.window {
            return None;
        }

        let average = self.sum / self.count as f32;
        self.sum = 0.0;
        self.count = 0;
        Some(self.apply(average))
    }

    /// Map a single reading straight to the colour (used once at startup)
    pub fn prime(&mut self, voltage: f32) -> Option<Rgb> {
        if voltage <= 0.0 {
            warn!("Battery voltage unavailable at startup");
            return None;
        }
        Some(self.apply(voltage))
    }

    fn apply(&mut self, voltage: f32) -> Rgb {
        self.color = charge_color(charge_percent(voltage, self.min_v, self.max_v));
        info!("Motor supply voltage: {:.2} Colour: {:?}", voltage, self.color);
        self.color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> BatteryMonitor {
        BatteryMonitor::new(&LoopConfig::default())
    }

    #[test]
    fn test_color_mapping() {
        let at = |v: f32| charge_color(charge_percent(v, 6.5, 8.0));
        assert_eq!(at(6.5), Rgb::new(120, 0, 0));
        assert_eq!(at(8.0), Rgb::new(0, 100, 0));
        assert_eq!(at(7.25), Rgb::new(60, 50, 0));
    }

    #[test]
    fn test_percent_clamped() {
        assert_eq!(charge_percent(5.0, 6.5, 8.0), 0.0);
        assert_eq!(charge_percent(9.1, 6.5, 8.0), 100.0);
    }

    #[test]
    fn test_starts_with_startup_color() {
        assert_eq!(monitor().color(), STARTUP_COLOR);
    }

    #[test]
    fn test_sampling_requires_idle_and_interval() {
        let mut m = monitor();
        for _ in 0..19 {
            assert!(!m.sample_due(0.0, 0.0));
        }
        assert!(m.sample_due(0.0, 0.0));
        // Counter restarts after a sample
        assert!(!m.sample_due(0.0, 0.0));

        let mut m = monitor();
        for _ in 0..40 {
            assert!(!m.sample_due(0.5, 0.0));
        }
        assert!(!m.sample_due(0.0, -0.1));
        // Interval has long elapsed; first idle cycle samples
        assert!(m.sample_due(0.0, 0.0));
    }

    #[test]
    fn test_window_average() {
        let mut m = monitor();
        for _ in 0..9 {
            assert_eq!(m.sample(7.0), None);
        }
        // Tenth sample completes the window: mean of 9x7.0 and 8.0 = 7.1
        let color = m.sample(8.0).unwrap();
        let expected = charge_color(charge_percent(7.1, 6.5, 8.0));
        assert_eq!(color, expected);
        assert_eq!(m.color(), expected);
        assert_eq!(m.pending_samples(), 0);
    }

    #[test]
    fn test_zero_voltage_keeps_color() {
        let mut m = monitor();
        assert_eq!(m.prime(7.25), Some(Rgb::new(60, 50, 0)));
        for _ in 0..20 {
            assert_eq!(m.sample(0.0), None);
        }
        assert_eq!(m.pending_samples(), 0);
        assert_eq!(m.color(), Rgb::new(60, 50, 0));
        assert_eq!(m.prime(0.0), None);
        assert_eq!(m.color(), Rgb::new(60, 50, 0));
    }
}
