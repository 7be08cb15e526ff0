//! Play/pause state and the scheduled tick that drives the render loop.

/// Identifies one scheduled tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

impl TickHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// Schedules the next render tick, e.g. on the display refresh or a fixed timer.
pub trait TickScheduler {
    fn request_tick(&mut self) -> TickHandle;

    /// Cancel a pending tick. Cancelling an already fired or unknown tick is a no-op.
    fn cancel_tick(&mut self, handle: TickHandle);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Paused,
    Playing,
}

/// Playback flag plus the armed tick.
///
/// A tick is armed only while playing; [`Playback::stop`] hands back the armed tick so it can
/// be cancelled with the scheduler.
#[derive(Debug, Default)]
pub struct Playback {
    state: PlaybackState,
    tick: Option<TickHandle>,
}

impl Playback {
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn armed_tick(&self) -> Option<TickHandle> {
        self.tick
    }

    /// Switch to playing and arm the first tick.
    ///
    /// Returns `false` without touching the scheduler when already playing.
    pub fn start<S: TickScheduler>(&mut self, scheduler: &mut S) -> bool {
        if self.is_playing() {
            return false;
        }

        self.state = PlaybackState::Playing;
        self.tick = Some(scheduler.request_tick());
        true
    }

    /// Switch to paused and cancel the armed tick.
    ///
    /// Returns `false` when already paused.
    pub fn stop<S: TickScheduler>(&mut self, scheduler: &mut S) -> bool {
        if !self.is_playing() {
            return false;
        }

        self.state = PlaybackState::Paused;
        if let Some(handle) = self.tick.take() {
            scheduler.cancel_tick(handle);
        }
        true
    }

    /// Consume the armed tick if `handle` is it. Stale handles are rejected.
    pub fn fire(&mut self, handle: TickHandle) -> bool {
        if self.tick == Some(handle) {
            self.tick = None;
            true
        } else {
            false
        }
    }

    /// Arm the next tick after a fired one, if still playing.
    pub fn rearm<S: TickScheduler>(&mut self, scheduler: &mut S) {
        if self.is_playing() && self.tick.is_none() {
            self.tick = Some(scheduler.request_tick());
        }
    }
}
