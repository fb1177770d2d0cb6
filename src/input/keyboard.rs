// Keyboard stand-in for the gamepad: W/S power, A/D turn, Q/E spin,
// Z slow, C turbo, Ctrl-K shutdown chord, Esc disconnect.
//
// Terminals only report presses and auto-repeats, so a held key is released
// once no repeat has arrived for HOLD_TIMEOUT.

use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::{debug, info, warn};

use super::{ControllerInput, InputError};
use crate::messages::{ConnectionStatus, InputEvent};

const HOLD_TIMEOUT: Duration = Duration::from_millis(100);

/// A held input and the event that releases it
#[derive(Debug, Clone, Copy, PartialEq)]
enum Held {
    Power,
    Turn,
    LeftTrigger,
    RightTrigger,
    Slow,
    Turbo,
    Combo,
}

impl Held {
    fn release_events(self) -> &'static [InputEvent] {
        match self {
            Held::Power => &[InputEvent::LeftStick { lr: 0.0, ud: 0.0 }],
            Held::Turn => &[InputEvent::RightStick { lr: 0.0, ud: 0.0 }],
            Held::LeftTrigger => &[InputEvent::LeftTrigger(-1.0)],
            Held::RightTrigger => &[InputEvent::RightTrigger(-1.0)],
            Held::Slow => &[InputEvent::LeftFrontButton(false)],
            Held::Turbo => &[InputEvent::RightFrontButton(false)],
            Held::Combo => &[
                InputEvent::Hat { lr: 0, ud: 0 },
                InputEvent::SquareButton(false),
                InputEvent::SelectButton(false),
            ],
        }
    }
}

pub struct KeyboardController {
    held: Vec<(Held, Instant)>,
}

impl KeyboardController {
    /// Put the terminal in raw mode; restored on drop
    pub fn open() -> Result<Self, InputError> {
        enable_raw_mode()?;
        info!(
            "Keyboard controller: W/S power, A/D turn, Q/E spin, Z slow, C turbo, \
             Ctrl-K shutdown, Esc quit"
        );
        Ok(Self { held: Vec::new() })
    }

    fn hold(&mut self, input: Held, events: &mut Vec<InputEvent>, pressed: &[InputEvent]) {
        events.extend_from_slice(pressed);
        let now = Instant::now();
        match self.held.iter_mut().find(|(h, _)| *h == input) {
            Some((_, at)) => *at = now,
            None => self.held.push((input, now)),
        }
    }

    fn release_expired(&mut self, events: &mut Vec<InputEvent>) {
        self.held.retain(|&(input, at)| {
            if at.elapsed() > HOLD_TIMEOUT {
                events.extend_from_slice(input.release_events());
                false
            } else {
                true
            }
        });
    }

    /// Map one key. Returns false when the key asks to disconnect.
    fn on_key(&mut self, key: KeyEvent, events: &mut Vec<InputEvent>) -> bool {
        if key.kind != KeyEventKind::Press && key.kind != KeyEventKind::Repeat {
            return true;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Char('c') if ctrl => return false,
            KeyCode::Char('k') if ctrl => self.hold(
                Held::Combo,
                events,
                &[
                    InputEvent::Hat { lr: 0, ud: -1 },
                    InputEvent::SquareButton(true),
                    InputEvent::SelectButton(true),
                ],
            ),
            KeyCode::Char('w') => {
                self.hold(Held::Power, events, &[InputEvent::LeftStick { lr: 0.0, ud: -1.0 }])
            }
            KeyCode::Char('s') => {
                self.hold(Held::Power, events, &[InputEvent::LeftStick { lr: 0.0, ud: 1.0 }])
            }
            KeyCode::Char('a') => {
                self.hold(Held::Turn, events, &[InputEvent::RightStick { lr: -1.0, ud: 0.0 }])
            }
            KeyCode::Char('d') => {
                self.hold(Held::Turn, events, &[InputEvent::RightStick { lr: 1.0, ud: 0.0 }])
            }
            KeyCode::Char('q') => {
                self.hold(Held::LeftTrigger, events, &[InputEvent::LeftTrigger(1.0)])
            }
            KeyCode::Char('e') => {
                self.hold(Held::RightTrigger, events, &[InputEvent::RightTrigger(1.0)])
            }
            KeyCode::Char('z') => {
                self.hold(Held::Slow, events, &[InputEvent::LeftFrontButton(true)])
            }
            KeyCode::Char('c') => {
                self.hold(Held::Turbo, events, &[InputEvent::RightFrontButton(true)])
            }
            _ => {}
        }
        true
    }
}

impl ControllerInput for KeyboardController {
    fn connection_status(&mut self) -> Result<ConnectionStatus, InputError> {
        Ok(ConnectionStatus::Connected)
    }

    fn poll_events(&mut self, events: &mut Vec<InputEvent>) -> Result<bool, InputError> {
        let mut connected = true;
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                connected &= self.on_key(key, events);
            }
        }
        self.release_expired(events);
        Ok(connected)
    }

    fn set_telemetry(&mut self, message: &str) {
        debug!("{}", message);
    }
}

impl Drop for KeyboardController {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!("Failed to restore terminal: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn controller() -> KeyboardController {
        // Raw mode is not needed to exercise the key mapping
        KeyboardController { held: Vec::new() }
    }

    #[test]
    fn test_stick_keys() {
        let mut k = controller();
        let mut events = Vec::new();
        assert!(k.on_key(press(KeyCode::Char('w'), KeyModifiers::NONE), &mut events));
        assert!(k.on_key(press(KeyCode::Char('d'), KeyModifiers::NONE), &mut events));
        assert_eq!(
            events,
            vec![
                InputEvent::LeftStick { lr: 0.0, ud: -1.0 },
                InputEvent::RightStick { lr: 1.0, ud: 0.0 },
            ]
        );
        assert_eq!(k.held.len(), 2);
    }

    #[test]
    fn test_shutdown_chord() {
        let mut k = controller();
        let mut events = Vec::new();
        k.on_key(press(KeyCode::Char('k'), KeyModifiers::CONTROL), &mut events);
        assert_eq!(events.len(), 3);
        assert!(events.contains(&InputEvent::SquareButton(true)));
    }

    #[test]
    fn test_escape_disconnects() {
        let mut k = controller();
        let mut events = Vec::new();
        assert!(!k.on_key(press(KeyCode::Esc, KeyModifiers::NONE), &mut events));
        assert!(!k.on_key(press(KeyCode::Char('c'), KeyModifiers::CONTROL), &mut events));
        // Plain 'c' is turbo, not quit
        assert!(k.on_key(press(KeyCode::Char('c'), KeyModifiers::NONE), &mut events));
        assert_eq!(events, vec![InputEvent::RightFrontButton(true)]);
    }

    #[test]
    fn test_release_after_timeout() {
        let mut k = controller();
        let mut events = Vec::new();
        k.on_key(press(KeyCode::Char('z'), KeyModifiers::NONE), &mut events);
        events.clear();

        k.release_expired(&mut events);
        assert!(events.is_empty());

        std::thread::sleep(HOLD_TIMEOUT + Duration::from_millis(20));
        k.release_expired(&mut events);
        assert_eq!(events, vec![InputEvent::LeftFrontButton(false)]);
        assert!(k.held.is_empty());
    }
}
