// Shutdown combo detection
//
// Hat down + square + select must all be held at the same time. Each flag
// follows the live state of its input, so releasing any one of them before
// the check cancels the request.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownSequencer {
    hat_down: bool,
    square: bool,
    select: bool,
}

impl ShutdownSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hat event; only a vertical value of -1 counts as down
    pub fn on_hat(&mut self, ud: i8) {
        self.hat_down = ud == -1;
    }

    pub fn on_square(&mut self, held: bool) {
        self.square = held;
    }

    pub fn on_select(&mut self, held: bool) {
        self.select = held;
    }

    pub fn flags(&self) -> [bool; 3] {
        [self.hat_down, self.square, self.select]
    }

    pub fn should_shutdown(&self) -> bool {
        self.hat_down && self.square && self.select
    }
}
