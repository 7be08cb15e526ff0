use std::time::{Duration, Instant};

/// Playback position that only advances while running.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaybackClock {
    accumulated: Duration,
    resumed_at: Option<Instant>,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.resumed_at.is_some()
    }

    pub fn resume(&mut self, now: Instant) {
        if self.resumed_at.is_none() {
            self.resumed_at = Some(now);
        }
    }

    pub fn pause(&mut self, now: Instant) {
        if let Some(resumed_at) = self.resumed_at.take() {
            self.accumulated += now.saturating_duration_since(resumed_at);
        }
    }

    pub fn position(&self, now: Instant) -> Duration {
        match self.resumed_at {
            Some(resumed_at) => self.accumulated + now.saturating_duration_since(resumed_at),
            None => self.accumulated,
        }
    }

    /// Stop and rewind to the start.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
