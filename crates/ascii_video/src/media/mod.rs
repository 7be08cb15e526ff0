//! Media sources feeding frames to the renderer.

use std::time::Instant;

use image::RgbaImage;

pub mod animation;
pub mod clock;
pub mod series;

pub use animation::AnimationSource;
pub use clock::PlaybackClock;
pub use series::FrameSeries;

/// Reason a media source refused to start playing.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("playback was refused: {0}")]
    Refused(String),
    #[error("media source is unavailable: {0}")]
    Unavailable(#[from] std::io::Error),
}

/// A single fixed media resource advancing on its own clock.
///
/// The renderer only observes the source; decoding progresses independently of ticks.
pub trait MediaSource {
    /// Start or resume playback. Playing after the end restarts from the beginning.
    fn play(&mut self, now: Instant) -> Result<(), PlaybackError>;

    fn pause(&mut self, now: Instant);

    /// Whether the source is currently not advancing.
    fn is_paused(&self) -> bool;

    /// Whether playback ran past the last frame.
    fn has_ended(&self) -> bool;

    /// Whether a first frame is available for display.
    fn is_ready(&self) -> bool;

    /// Frame matching the playback position at `now`, if one has been decoded.
    fn current_frame(&mut self, now: Instant) -> Option<&RgbaImage>;
}
