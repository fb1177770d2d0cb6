// Controller input sources
//
// The control loop drains events synchronously once per cycle; handlers run to
// completion before any motor command is computed.

pub mod keyboard;
pub mod scripted;

pub use keyboard::KeyboardController;
pub use scripted::ScriptedController;

use crate::messages::{ConnectionStatus, InputEvent};

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait ControllerInput {
    /// Report initialisation progress. Called repeatedly until the status is
    /// `Connected` or `NotDetected`; the loop pauses `connect_poll_ms` between
    /// calls, so implementations may return immediately.
    fn connection_status(&mut self) -> Result<ConnectionStatus, InputError>;

    /// Append queued events to `events`. Returns false once the controller is gone.
    fn poll_events(&mut self, events: &mut Vec<InputEvent>) -> Result<bool, InputError>;

    /// Status text for the collaborator to display
    fn set_telemetry(&mut self, _message: &str) {}
}
