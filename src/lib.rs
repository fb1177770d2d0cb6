// Teleoperation runtime for a differential-drive robot

pub mod config;
pub mod drive;
pub mod hardware;
pub mod host;
pub mod input;
pub mod messages;
pub mod runtime;
pub mod shutdown;
pub mod status;
