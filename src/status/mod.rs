// Status indication: battery colour and the scanning LED animation

pub mod battery;
pub mod led;

pub use battery::BatteryMonitor;
pub use led::{LedAnimator, LedFrame};
