use std::time::{Duration, Instant};

pub const STEP_PERCENT: u8 = 5;
pub const STEP_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    Running(u8),
    Complete,
}

/// Fake upload progress: +5% every 100ms until 100%. Not tied to the
/// actual transfer.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressTicker {
    percent: u8,
    next_step: Instant,
    cancelled: bool,
}

impl ProgressTicker {
    pub fn start(now: Instant) -> Self {
        Self {
            percent: 0,
            next_step: now + STEP_INTERVAL,
            cancelled: false,
        }
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn fraction(&self) -> f32 {
        f32::from(self.percent) / 100.0
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Applies every step that is due by `now`. Reports `Complete` exactly
    /// once, on the call that reaches 100%.
    pub fn advance(&mut self, now: Instant) -> Tick {
        if self.cancelled || self.percent >= 100 {
            return Tick::Running(self.percent);
        }
        while self.percent < 100 && now >= self.next_step {
            self.percent += STEP_PERCENT;
            self.next_step += STEP_INTERVAL;
        }
        if self.percent >= 100 {
            Tick::Complete
        } else {
            Tick::Running(self.percent)
        }
    }

    /// Time left until the next step is due, for scheduling a repaint.
    pub fn until_next(&self, now: Instant) -> Duration {
        self.next_step.saturating_duration_since(now)
    }
}
