//! Per-question countdown.

/// Seconds granted to each question.
pub const DEFAULT_QUESTION_SECONDS: u32 = 30;

/// Outcome of a one-second tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The countdown is not running.
    Idle,
    /// Still running with this many seconds left.
    Running(u32),
    /// Reached zero on this tick. Reported once per question entry.
    Expired,
}

/// One-second resolution countdown for the active question.
#[derive(Debug, Clone)]
pub struct Countdown {
    budget: u32,
    remaining: u32,
    running: bool,
    expiry_handled: bool,
}

impl Countdown {
    pub fn new(budget: u32) -> Self {
        Self {
            budget,
            remaining: budget,
            running: false,
            expiry_handled: false,
        }
    }

    /// Start counting for a newly entered question.
    ///
    /// `saved` is the remaining time captured when the question was last
    /// left. A saved zero means the question is frozen: the countdown stays
    /// stopped and can never report expiry again.
    pub fn enter(&mut self, saved: Option<u32>) {
        self.remaining = saved.unwrap_or(self.budget).min(self.budget);
        self.running = self.remaining > 0;
        self.expiry_handled = self.remaining == 0;
    }

    pub fn tick(&mut self) -> Tick {
        if !self.running {
            return Tick::Idle;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return Tick::Running(self.remaining);
        }

        self.running = false;
        if self.claim_expiry() {
            Tick::Expired
        } else {
            Tick::Idle
        }
    }

    /// Stop counting and return the remaining seconds.
    pub fn stop(&mut self) -> u32 {
        self.running = false;
        self.remaining
    }

    /// Take the expiry guard. Only the first caller per entry gets `true`.
    pub fn claim_expiry(&mut self) -> bool {
        if self.expiry_handled {
            return false;
        }
        self.expiry_handled = true;
        true
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_QUESTION_SECONDS)
    }
}
