use std::time::Duration;

use image::RgbaImage;

/// Delay used for frames that carry no timing information.
pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(100);

#[derive(Clone, Debug)]
struct TimedFrame {
    image: RgbaImage,
    duration: Duration,
}

/// Decoded frames played once, in order, each for its own duration.
#[derive(Clone, Debug, Default)]
pub struct FrameSeries {
    frames: Vec<TimedFrame>,
    total_duration: Duration,
}

impl FrameSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn push_frame(&mut self, image: RgbaImage, duration: Duration) {
        let duration = if duration.is_zero() { DEFAULT_FRAME_DELAY } else { duration };
        self.total_duration += duration;
        self.frames.push(TimedFrame { image, duration });
    }

    /// Index of the frame showing at `elapsed`, or `None` once the series has run out.
    pub fn frame_index_at(&self, elapsed: Duration) -> Option<usize> {
        if elapsed >= self.total_duration {
            return None;
        }

        let mut remaining = elapsed;
        for (index, frame) in self.frames.iter().enumerate() {
            if remaining < frame.duration {
                return Some(index);
            }
            remaining -= frame.duration;
        }

        None
    }

    pub fn frame(&self, index: usize) -> Option<&RgbaImage> {
        self.frames.get(index).map(|frame| &frame.image)
    }
}
