use std::time::{Duration, Instant};

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::ascii::gradient::Gradient;
use crate::ascii::mapping::GlyphMapper;

/// Offscreen RGBA buffer sized to the character grid, one pixel per cell.
#[derive(Clone, Debug)]
pub struct SamplingSurface {
    pixels: RgbaImage,
}

impl SamplingSurface {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self { pixels: RgbaImage::new(u32::from(columns), u32::from(rows)) }
    }

    pub fn columns(&self) -> u16 {
        self.pixels.width() as u16
    }

    pub fn rows(&self) -> u16 {
        self.pixels.height() as u16
    }

    /// Reallocate for a new grid size. Content is discarded.
    pub fn resize(&mut self, columns: u16, rows: u16) {
        if (self.columns(), self.rows()) != (columns, rows) {
            self.pixels = RgbaImage::new(u32::from(columns), u32::from(rows));
        }
    }

    /// Draw `frame` stretched over the whole surface.
    pub fn draw(&mut self, frame: &RgbaImage) {
        if frame.dimensions() == self.pixels.dimensions() {
            self.pixels.copy_from_slice(frame.as_raw());
        } else {
            let (width, height) = self.pixels.dimensions();
            self.pixels = imageops::resize(frame, width, height, FilterType::Triangle);
        }
    }

    /// Raw row-major RGBA bytes.
    pub fn data(&self) -> &[u8] {
        self.pixels.as_raw()
    }
}

/// Best-effort cap on the rendered frame rate.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameThrottle {
    interval: Option<Duration>,
    last_render: Option<Instant>,
}

impl FrameThrottle {
    /// `None` or a non-positive rate disables throttling.
    pub fn new(frame_rate: Option<f32>) -> Self {
        let interval = frame_rate
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .map(|fps| Duration::from_secs_f64(1.0 / f64::from(fps)));
        Self { interval, last_render: None }
    }

    /// Whether enough time passed since the last rendered frame. Records `now` when it did.
    pub fn ready(&mut self, now: Instant) -> bool {
        let due = match (self.interval, self.last_render) {
            (Some(interval), Some(last)) => now.saturating_duration_since(last) >= interval,
            _ => true,
        };

        if due {
            self.last_render = Some(now);
        }
        due
    }

    pub fn reset(&mut self) {
        self.last_render = None;
    }
}

/// Converts media frames into text blocks at grid resolution.
#[derive(Debug)]
pub struct FrameSampler {
    surface: SamplingSurface,
    mapper: GlyphMapper,
    throttle: FrameThrottle,
    text: String,
}

impl FrameSampler {
    pub fn new(columns: u16, rows: u16, gradient: Gradient, frame_rate: Option<f32>) -> Self {
        Self {
            surface: SamplingSurface::new(columns, rows),
            mapper: GlyphMapper::new(gradient),
            throttle: FrameThrottle::new(frame_rate),
            text: String::new(),
        }
    }

    pub fn resize(&mut self, columns: u16, rows: u16) {
        self.surface.resize(columns, rows);
    }

    pub fn throttle_mut(&mut self) -> &mut FrameThrottle {
        &mut self.throttle
    }

    /// Scale `frame` onto the surface, read it back and map every cell to a glyph.
    pub fn sample(&mut self, frame: &RgbaImage) -> &str {
        self.surface.draw(frame);
        self.mapper.write_rgba_text(
            self.surface.data(),
            self.surface.columns(),
            self.surface.rows(),
            &mut self.text,
        );
        &self.text
    }
}
