// Fixed-rate teleoperation loop
//
// Each cycle: drain controller input -> watchdog pulse -> speed mode -> mix ->
// slew limit -> motor command -> LED animation -> battery sampling -> exit checks.
// The hardware is held by a guard for the whole run, so motors are stopped and
// LEDs cleared on every exit path, including errors raised mid-cycle.

use std::thread::sleep;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::config::{
    LoopConfig, CONNECTED_COLOR, NOT_DETECTED_COLOR, NOT_DETECTED_FLASHES, READY_COLOR,
    SLOW_COLOR, TURBO_COLOR,
};
use crate::drive::{mix, SmoothedMotorState, SpeedMode};
use crate::hardware::{HardwareError, HardwareGuard, RobotHardware};
use crate::input::{ControllerInput, InputError};
use crate::messages::{ConnectionStatus, InputEvent, Rgb, Telemetry};
use crate::shutdown::ShutdownSequencer;
use crate::status::{BatteryMonitor, LedAnimator, LedFrame};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),

    #[error("Controller error: {0}")]
    Input(#[from] InputError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Initializing,
    Running,
    Terminating,
    Stopped,
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// No supported controller found at startup
    ControllerNotDetected,
    Disconnected,
    ShutdownCombo,
}

/// Raw stick positions as last reported by the controller
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControllerAxes {
    pub power: f32,
    pub turn: f32,
    /// Set by the triggers, which spin in place at full speed regardless of mode
    pub spin: bool,
}

impl ControllerAxes {
    /// Axis values after the speed mode divisor
    pub fn damped(&self, divisor: f32) -> (f32, f32) {
        if self.spin {
            (self.power, self.turn)
        } else {
            (self.power / divisor, self.turn / divisor)
        }
    }

    pub fn is_idle(&self) -> bool {
        self.power == 0.0 && self.turn == 0.0
    }
}

/// Everything the loop carries from one cycle to the next
pub struct LoopState {
    pub axes: ControllerAxes,
    pub slow_held: bool,
    pub turbo_held: bool,
    pub shutdown: ShutdownSequencer,
    pub motors: SmoothedMotorState,
    pub leds: LedAnimator,
    pub battery: BatteryMonitor,
    pub telemetry: Telemetry,
}

impl LoopState {
    pub fn new(config: &LoopConfig, led_count: usize) -> Self {
        Self {
            axes: ControllerAxes::default(),
            slow_held: false,
            turbo_held: false,
            shutdown: ShutdownSequencer::new(),
            motors: SmoothedMotorState::default(),
            leds: LedAnimator::new(led_count, config.led_update_interval),
            battery: BatteryMonitor::new(config),
            telemetry: Telemetry::default(),
        }
    }

    pub fn speed_mode(&self) -> SpeedMode {
        SpeedMode::select(self.slow_held, self.turbo_held)
    }

    /// Apply one controller event
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::LeftTrigger(val) => {
                self.axes.power = 0.0;
                self.axes.turn = -(val + 1.0) / 2.0;
                self.axes.spin = true;
            }
            InputEvent::RightTrigger(val) => {
                self.axes.power = 0.0;
                self.axes.turn = (val + 1.0) / 2.0;
                self.axes.spin = true;
            }
            InputEvent::LeftStick { ud, .. } => {
                self.axes.power = -ud;
                self.axes.spin = false;
            }
            InputEvent::RightStick { lr, .. } => {
                self.axes.turn = lr;
                self.axes.spin = false;
            }
            InputEvent::LeftFrontButton(held) => self.slow_held = held,
            InputEvent::RightFrontButton(held) => self.turbo_held = held,
            InputEvent::Hat { ud, .. } => self.shutdown.on_hat(ud),
            InputEvent::SquareButton(held) => self.shutdown.on_square(held),
            InputEvent::SelectButton(held) => self.shutdown.on_select(held),
        }
    }

    /// Colour of the scanning animation for the current mode
    pub fn mode_color(&self) -> Rgb {
        match self.speed_mode() {
            SpeedMode::Normal => self.battery.color(),
            SpeedMode::Slow => SLOW_COLOR,
            SpeedMode::Turbo => TURBO_COLOR,
        }
    }
}

/// Sleeps until the next cycle deadline; a no-op when unpaced
struct Pacer {
    period: Option<Duration>,
    next: Instant,
}

impl Pacer {
    fn new(period: Option<Duration>) -> Self {
        Self {
            period,
            next: Instant::now(),
        }
    }

    fn wait(&mut self) {
        let Some(period) = self.period else {
            return;
        };
        let now = Instant::now();
        if self.next > now {
            sleep(self.next - now);
            self.next += period;
        } else {
            // Running late; restart the schedule rather than bursting
            self.next = now + period;
        }
    }
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        sleep(duration);
    }
}

/// LED index and colour for a "waiting for slot N" status. Slots come in banks
/// of eight, each bank with its own colour; slots past the fourth bank are not shown.
pub fn slot_indicator(slot: u32) -> Option<(usize, Rgb)> {
    if slot == 0 {
        return None;
    }
    let color = match (slot - 1) / 8 {
        0 => Rgb::new(96, 0, 96),
        1 => Rgb::new(96, 96, 0),
        2 => Rgb::new(160, 80, 0),
        3 => Rgb::new(164, 2, 2),
        _ => return None,
    };
    Some((((slot - 1) % 8) as usize, color))
}

/// Drive the LEDs to show controller initialisation progress
pub fn show_connection_status<H: RobotHardware + ?Sized>(
    hardware: &mut H,
    status: ConnectionStatus,
    config: &LoopConfig,
) -> Result<(), HardwareError> {
    match status {
        ConnectionStatus::Connected => {
            info!("Supported controller connected");
            hardware.set_all_leds_color(CONNECTED_COLOR)?;
        }
        ConnectionStatus::NotDetected => {
            warn!("No supported controller detected");
            for _ in 0..NOT_DETECTED_FLASHES {
                hardware.set_all_leds_color(NOT_DETECTED_COLOR)?;
                pause(config.flash_period());
                hardware.set_leds_all_off()?;
                hardware.show_leds()?;
                pause(config.flash_period());
            }
        }
        ConnectionStatus::WaitingForSlot(slot) => {
            info!("Waiting for controller {}", slot);
            if let Some((index, color)) = slot_indicator(slot) {
                if index < hardware.led_count() {
                    hardware.set_led_color(index, color)?;
                }
            }
            hardware.show_leds()?;
        }
    }
    Ok(())
}

fn render_frame<H: RobotHardware + ?Sized>(
    hardware: &mut H,
    frame: &LedFrame,
) -> Result<(), HardwareError> {
    debug!("LED frame: {:?}", frame.pixels);
    hardware.set_leds_all_off()?;
    for &(index, color) in &frame.pixels {
        hardware.set_led_color(index, color)?;
    }
    hardware.show_leds()
}

pub struct ControlLoop {
    config: LoopConfig,
    phase: LoopPhase,
    state: Option<LoopState>,
    events: Vec<InputEvent>,
}

impl ControlLoop {
    pub fn new(config: LoopConfig) -> Self {
        Self {
            config,
            phase: LoopPhase::Initializing,
            state: None,
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    /// State of the last run, once it has started
    pub fn state(&self) -> Option<&LoopState> {
        self.state.as_ref()
    }

    fn set_phase(&mut self, phase: LoopPhase) {
        if self.phase != phase {
            info!("Control loop {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    /// Run until the controller disconnects, the shutdown combo is held, or an
    /// error occurs. Cleanup has always run by the time this returns.
    pub fn run<H, I>(&mut self, hardware: &mut H, input: &mut I) -> Result<ExitReason, RuntimeError>
    where
        H: RobotHardware,
        I: ControllerInput,
    {
        info!("Starting control loop for {}", hardware.robot_name());
        self.phase = LoopPhase::Initializing;
        self.state = Some(LoopState::new(&self.config, hardware.led_count()));

        let mut guard = HardwareGuard::new(hardware);
        let outcome = self.operate(&mut *guard, input);

        self.set_phase(LoopPhase::Terminating);
        let cleanup = guard.release();
        self.set_phase(LoopPhase::Stopped);

        match (outcome, cleanup) {
            (Ok(reason), Ok(())) => {
                info!("Control loop stopped: {:?}", reason);
                Ok(reason)
            }
            (Ok(_), Err(e)) => {
                error!("Cleanup failed: {}", e);
                Err(e.into())
            }
            (Err(e), cleanup) => {
                if let Err(cleanup_err) = cleanup {
                    warn!("Cleanup after failure also failed: {}", cleanup_err);
                }
                error!("Control loop failed: {}", e);
                Err(e)
            }
        }
    }

    fn operate<H, I>(&mut self, hardware: &mut H, input: &mut I) -> Result<ExitReason, RuntimeError>
    where
        H: RobotHardware,
        I: ControllerInput,
    {
        loop {
            let status = input.connection_status()?;
            show_connection_status(hardware, status, &self.config)?;
            match status {
                ConnectionStatus::Connected => break,
                ConnectionStatus::NotDetected => return Ok(ExitReason::ControllerNotDetected),
                ConnectionStatus::WaitingForSlot(_) => pause(self.config.connect_poll()),
            }
        }

        self.set_phase(LoopPhase::Running);
        hardware.set_all_leds_color(READY_COLOR)?;
        pause(self.config.ready_hold());
        let volts = hardware.battery_voltage()?;
        if let Some(state) = self.state.as_mut() {
            state.battery.prime(volts);
        }

        info!(
            "Running: {}Hz loop, max change {}/cycle",
            self.config.loop_hz, self.config.max_change_rate
        );
        let mut pacer = Pacer::new(self.config.cycle_period());
        loop {
            pacer.wait();
            if let Some(reason) = self.cycle(hardware, input)? {
                return Ok(reason);
            }
        }
    }

    /// One control cycle. Returns the exit reason when the loop should stop.
    fn cycle<H, I>(
        &mut self,
        hardware: &mut H,
        input: &mut I,
    ) -> Result<Option<ExitReason>, RuntimeError>
    where
        H: RobotHardware,
        I: ControllerInput,
    {
        let config = &self.config;
        let Some(state) = self.state.as_mut() else {
            return Ok(Some(ExitReason::Disconnected));
        };

        // 1. Publish last cycle's telemetry, then drain input
        input.set_telemetry(&state.telemetry.to_string());
        self.events.clear();
        let connected = input.poll_events(&mut self.events)?;
        for event in self.events.drain(..) {
            state.handle_event(event);
        }

        // 2. Watchdog
        hardware.keep_alive()?;

        // 3. Mode -> mix -> slew limit -> motors
        let mode = state.speed_mode();
        let (power, turn) = state.axes.damped(mode.damping(config));
        let mixed = mix(power, turn);
        state.motors.step(mixed.targets, config.max_change_rate);
        let (left, right) = state.motors.command();
        hardware.set_motors_power(left, right)?;

        state.telemetry = Telemetry {
            power,
            turn,
            angle_deg: mixed.angle.to_degrees(),
            scale_factor: mixed.scale_factor,
            target_left: mixed.targets.left,
            target_right: mixed.targets.right,
            real_left: state.motors.real_left,
            real_right: state.motors.real_right,
            shutdown_flags: state.shutdown.flags(),
        };
        debug!("{:?} {}", mode, state.telemetry);

        // 4. LED animation on its own cadence
        if state.leds.cycle_due() {
            let color = state.mode_color();
            let frame = state.leds.tick(color);
            render_frame(hardware, &frame)?;
        }

        // 5. Battery, only while the sticks are centred
        if state.battery.sample_due(state.axes.power, state.axes.turn) {
            let volts = hardware.battery_voltage()?;
            state.battery.sample(volts);
        }

        // 6. Exit conditions
        if state.shutdown.should_shutdown() {
            info!("Shutdown combo held");
            return Ok(Some(ExitReason::ShutdownCombo));
        }
        if !connected {
            info!("Controller disconnected");
            return Ok(Some(ExitReason::Disconnected));
        }
        Ok(None)
    }
}
