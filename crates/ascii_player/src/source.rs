use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use ascii_video::{AnimationSource, MediaSource, PlaybackError};
use image::RgbaImage;
use log::{info, warn};

use crate::audio::AudioTrack;
use crate::config::{AudioConfig, VideoConfig};
use crate::ffmpeg::{self, DecodeSettings, FfmpegVideo};

/// Extensions decoded in-process and played without sound.
const ANIMATION_EXTENSIONS: [&str; 4] = ["gif", "png", "jpg", "jpeg"];

/// Media the player can open.
pub enum Source {
    Video(FfmpegVideo),
    Animation(AnimationSource),
}

impl Source {
    pub fn open(video: &VideoConfig, audio: &AudioConfig) -> Result<Self> {
        let path = video.path.as_path();
        if !path.is_file() {
            bail!("media file {} does not exist", path.display());
        }

        if is_animation(path) {
            let animation = AnimationSource::open(path)
                .with_context(|| format!("failed to decode {}", path.display()))?;
            info!("loaded {} frames from {}", animation.series().len(), path.display());
            return Ok(Source::Animation(animation));
        }

        let version = ffmpeg::probe().context("ffmpeg is required to play video files")?;
        info!("using {version}");

        let track = if !audio.enabled {
            None
        } else if AudioTrack::available() {
            Some(AudioTrack::new(path, audio.volume))
        } else {
            warn!("ffplay not found, playing without audio");
            None
        };

        let settings = DecodeSettings {
            path: path.to_path_buf(),
            width: video.decode_width,
            height: video.decode_height,
            fps: video.decode_fps,
        };
        let video = FfmpegVideo::open(settings, track)
            .with_context(|| format!("failed to start decoding {}", path.display()))?;
        info!("decoding {} (audio: {})", video.path().display(), video.has_audio());

        Ok(Source::Video(video))
    }
}

impl MediaSource for Source {
    fn play(&mut self, now: Instant) -> Result<(), PlaybackError> {
        match self {
            Source::Video(video) => video.play(now),
            Source::Animation(animation) => animation.play(now),
        }
    }

    fn pause(&mut self, now: Instant) {
        match self {
            Source::Video(video) => video.pause(now),
            Source::Animation(animation) => animation.pause(now),
        }
    }

    fn is_paused(&self) -> bool {
        match self {
            Source::Video(video) => video.is_paused(),
            Source::Animation(animation) => animation.is_paused(),
        }
    }

    fn has_ended(&self) -> bool {
        match self {
            Source::Video(video) => video.has_ended(),
            Source::Animation(animation) => animation.has_ended(),
        }
    }

    fn is_ready(&self) -> bool {
        match self {
            Source::Video(video) => video.is_ready(),
            Source::Animation(animation) => animation.is_ready(),
        }
    }

    fn current_frame(&mut self, now: Instant) -> Option<&RgbaImage> {
        match self {
            Source::Video(video) => video.current_frame(now),
            Source::Animation(animation) => animation.current_frame(now),
        }
    }
}

fn is_animation(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ANIMATION_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}
