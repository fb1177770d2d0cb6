// Replays a fixed sequence of connection statuses and per-cycle event batches.
// The controller reports itself disconnected once the script runs out.

use std::collections::VecDeque;

use super::{ControllerInput, InputError};
use crate::messages::{ConnectionStatus, InputEvent};

#[derive(Debug, Clone)]
pub struct ScriptedController {
    statuses: VecDeque<ConnectionStatus>,
    cycles: VecDeque<Vec<InputEvent>>,
    polls: usize,
    telemetry: Option<String>,
}

impl Default for ScriptedController {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedController {
    /// Connects on the first status check
    pub fn new() -> Self {
        Self::with_statuses(vec![ConnectionStatus::Connected])
    }

    pub fn with_statuses(statuses: Vec<ConnectionStatus>) -> Self {
        Self {
            statuses: statuses.into(),
            cycles: VecDeque::new(),
            polls: 0,
            telemetry: None,
        }
    }

    /// Queue the events delivered by one poll
    pub fn cycle(mut self, events: Vec<InputEvent>) -> Self {
        self.cycles.push_back(events);
        self
    }

    /// Queue `n` polls with no events
    pub fn idle(mut self, n: usize) -> Self {
        self.cycles.extend(std::iter::repeat_n(Vec::new(), n));
        self
    }

    pub fn polls(&self) -> usize {
        self.polls
    }

    /// Last telemetry line set by the loop
    pub fn telemetry(&self) -> Option<&str> {
        self.telemetry.as_deref()
    }
}

impl ControllerInput for ScriptedController {
    fn connection_status(&mut self) -> Result<ConnectionStatus, InputError> {
        Ok(self
            .statuses
            .pop_front()
            .unwrap_or(ConnectionStatus::NotDetected))
    }

    fn poll_events(&mut self, events: &mut Vec<InputEvent>) -> Result<bool, InputError> {
        self.polls += 1;
        match self.cycles.pop_front() {
            Some(batch) => {
                events.extend(batch);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn set_telemetry(&mut self, message: &str) {
        self.telemetry = Some(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replays_then_disconnects() {
        let mut c = ScriptedController::new()
            .cycle(vec![InputEvent::SquareButton(true)])
            .idle(1);
        assert_eq!(c.connection_status().unwrap(), ConnectionStatus::Connected);

        let mut events = Vec::new();
        assert!(c.poll_events(&mut events).unwrap());
        assert_eq!(events, vec![InputEvent::SquareButton(true)]);

        events.clear();
        assert!(c.poll_events(&mut events).unwrap());
        assert!(events.is_empty());

        assert!(!c.poll_events(&mut events).unwrap());
        assert_eq!(c.polls(), 3);
    }

    #[test]
    fn test_statuses_run_out_as_not_detected() {
        let mut c = ScriptedController::with_statuses(vec![ConnectionStatus::WaitingForSlot(1)]);
        assert_eq!(
            c.connection_status().unwrap(),
            ConnectionStatus::WaitingForSlot(1)
        );
        assert_eq!(c.connection_status().unwrap(), ConnectionStatus::NotDetected);
    }
}
