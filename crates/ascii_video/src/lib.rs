mod ascii;
pub mod config;
pub mod layout;
pub mod media;
pub mod output;
pub mod playback;
pub mod renderer;
pub mod sampler;

pub use ascii::{gradient::Gradient, mapping::GlyphMapper};
pub use config::RendererConfig;
pub use layout::{GridLayout, LayoutConfig, SizeAdapter, Viewport};
pub use media::{AnimationSource, MediaSource, PlaybackClock, PlaybackError};
pub use output::OutputSurface;
pub use playback::{Playback, PlaybackState, TickHandle, TickScheduler};
pub use renderer::{Renderer, LOADING_MESSAGE, PLAY_BLOCKED_MESSAGE, READY_MESSAGE};
pub use sampler::{FrameSampler, FrameThrottle, SamplingSurface};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("glyph ramp needs at least two characters, got {0}")]
    InvalidGradient(usize),
    #[error("invalid layout: {0}")]
    InvalidLayout(String),
    #[error("invalid renderer config: {0}")]
    InvalidConfig(String),
    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),
    #[error("surface i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
