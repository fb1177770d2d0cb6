// Host power-off after the shutdown combo

use std::process::Command;

use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Could not run shutdown command: {0}")]
    Spawn(#[from] std::io::Error),

    // Usually means the process lacks root privileges
    #[error("Shutdown command exited with {0}")]
    Refused(std::process::ExitStatus),
}

/// Ask the host to power off now. Only works with elevated privileges.
pub fn request_poweroff() -> Result<(), HostError> {
    info!("Requesting host power-off");
    let status = Command::new("shutdown").arg("now").status()?;
    if status.success() {
        Ok(())
    } else {
        Err(HostError::Refused(status))
    }
}
