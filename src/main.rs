use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use tank_teleop_runtime::config::LoopConfig;
use tank_teleop_runtime::hardware::SimulatedRobot;
use tank_teleop_runtime::host::request_poweroff;
use tank_teleop_runtime::input::KeyboardController;
use tank_teleop_runtime::runtime::{ControlLoop, ExitReason};

/// Tank-steer teleoperation loop (simulated robot, keyboard controller)
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON file with loop tunables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the loop rate (0 = unpaced)
    #[arg(long)]
    hz: Option<u64>,

    /// Number of LEDs on the simulated strip
    #[arg(long, default_value_t = 8)]
    led_count: usize,

    /// Battery voltage reported by the simulated robot
    #[arg(long, default_value_t = 7.4)]
    battery_volts: f32,

    /// Power off the host when the shutdown combo is held
    #[arg(long)]
    allow_poweroff: bool,

    /// Robot name
    #[arg(long, default_value = "sim-tank")]
    name: String,
}

fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(Args::parse()) {
        error!("Runtime error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut config = match &args.config {
        Some(path) => LoopConfig::load(path)?,
        None => LoopConfig::default(),
    };
    if let Some(hz) = args.hz {
        config.loop_hz = hz;
    }
    config.allow_poweroff |= args.allow_poweroff;
    config.validate()?;
    let allow_poweroff = config.allow_poweroff;

    let mut robot = SimulatedRobot::new(&args.name, args.led_count, args.battery_volts);
    let reason = {
        let mut controller = KeyboardController::open()?;
        ControlLoop::new(config).run(&mut robot, &mut controller)?
    };

    if reason == ExitReason::ShutdownCombo {
        if allow_poweroff {
            if let Err(e) = request_poweroff() {
                warn!("Host power-off failed: {}", e);
            }
        } else {
            info!("Shutdown combo held; host power-off not enabled");
        }
    }
    Ok(())
}
