// Drive control for the tank-steered base
//
// Provides:
// - Stick mixing (power, turn -> left/right power)
// - Per-cycle slew limiting of the applied power
// - Speed mode (damping) selection

pub mod mixer;
pub mod slew;
pub mod speed_mode;

pub use mixer::{mix, Mix, MotorTargets, MAX_POWER};
pub use slew::{limit, SmoothedMotorState};
pub use speed_mode::SpeedMode;
