use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::{Duration, Instant};

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, RgbaImage};
use log::debug;

use super::clock::PlaybackClock;
use super::series::{FrameSeries, DEFAULT_FRAME_DELAY};
use super::{MediaSource, PlaybackError};
use crate::Error;

/// Silent media source over pre-decoded frames (GIF animations and still images).
#[derive(Debug)]
pub struct AnimationSource {
    series: FrameSeries,
    clock: PlaybackClock,
    current: Option<usize>,
    ended: bool,
}

impl AnimationSource {
    pub fn new(series: FrameSeries) -> Self {
        Self { series, clock: PlaybackClock::new(), current: None, ended: false }
    }

    /// Decode a GIF animation, or any still image format `image` understands.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let is_gif = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("gif"))
            .unwrap_or(false);

        let series = if is_gif { load_gif(path)? } else { load_image(path)? };
        Ok(Self::new(series))
    }

    pub fn series(&self) -> &FrameSeries {
        &self.series
    }
}

impl MediaSource for AnimationSource {
    fn play(&mut self, now: Instant) -> Result<(), PlaybackError> {
        if self.series.is_empty() {
            return Err(PlaybackError::Refused("animation has no frames".into()));
        }

        if self.ended {
            self.clock.reset();
            self.current = None;
            self.ended = false;
        }

        self.clock.resume(now);
        Ok(())
    }

    fn pause(&mut self, now: Instant) {
        self.clock.pause(now);
    }

    fn is_paused(&self) -> bool {
        !self.clock.is_running()
    }

    fn has_ended(&self) -> bool {
        self.ended
    }

    fn is_ready(&self) -> bool {
        !self.series.is_empty()
    }

    fn current_frame(&mut self, now: Instant) -> Option<&RgbaImage> {
        if !self.ended {
            match self.series.frame_index_at(self.clock.position(now)) {
                Some(index) => self.current = Some(index),
                None => {
                    self.clock.pause(now);
                    self.ended = true;
                    self.current = self.series.len().checked_sub(1);
                },
            }
        }

        self.current.and_then(|index| self.series.frame(index))
    }
}

fn load_gif(path: &Path) -> Result<FrameSeries, Error> {
    let file = File::open(path)?;
    let decoder = GifDecoder::new(BufReader::new(file))?;
    let frames = decoder.into_frames().collect_frames()?;

    let mut series = FrameSeries::new();
    for frame in frames {
        let delay = Duration::from(frame.delay());
        series.push_frame(frame.into_buffer(), delay);
    }

    debug!("loaded {} animation frames from {}", series.len(), path.display());
    Ok(series)
}

fn load_image(path: &Path) -> Result<FrameSeries, Error> {
    let image = image::open(path)?.into_rgba8();
    let (w, h) = image.dimensions();
    debug!("loaded still image {w}x{h} from {}", path.display());

    // A still image is shown for a single frame delay, then the source ends.
    let mut series = FrameSeries::new();
    series.push_frame(image, DEFAULT_FRAME_DELAY);
    Ok(series)
}
