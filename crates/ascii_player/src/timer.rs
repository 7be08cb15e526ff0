use std::time::{Duration, Instant};

use ascii_video::{TickHandle, TickScheduler};

/// Fixed-interval stand-in for a display refresh callback.
///
/// Only one tick is pending at a time; requesting a new one replaces it.
#[derive(Debug)]
pub struct FrameTimer {
    interval: Duration,
    next_id: u64,
    pending: Option<(TickHandle, Instant)>,
}

impl FrameTimer {
    pub fn new(interval: Duration) -> Self {
        Self { interval, next_id: 0, pending: None }
    }

    pub fn pending(&self) -> Option<TickHandle> {
        self.pending.map(|(handle, _)| handle)
    }

    /// Hand out the pending tick once its deadline passed.
    pub fn take_due(&mut self, now: Instant) -> Option<TickHandle> {
        match self.pending {
            Some((handle, deadline)) if deadline <= now => {
                self.pending = None;
                Some(handle)
            },
            _ => None,
        }
    }

    /// Time left until the pending tick is due.
    pub fn timeout(&self, now: Instant) -> Option<Duration> {
        self.pending.map(|(_, deadline)| deadline.saturating_duration_since(now))
    }

    fn schedule(&mut self, now: Instant) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle::new(self.next_id);
        self.pending = Some((handle, now + self.interval));
        handle
    }
}

impl TickScheduler for FrameTimer {
    fn request_tick(&mut self) -> TickHandle {
        self.schedule(Instant::now())
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        if self.pending() == Some(handle) {
            self.pending = None;
        }
    }
}
