//! Viewport-fit sizing of the character grid and its font metrics.

use serde::Deserialize;

use crate::Error;

/// Viewport size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Zero-sized viewports are treated as one pixel wide/tall.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width: width.max(1), height: height.max(1) }
    }
}

/// Grid dimensions and font metrics chosen for a viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    pub columns: u16,
    pub rows: u16,
    pub font_size: f32,
    pub line_height: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Assumed pixel width of one character when bounding the grid by the viewport.
    pub char_width_px: f32,
    /// Assumed pixel height of one character when bounding the grid by the viewport.
    pub char_height_px: f32,
    /// Visual width / height ratio of a glyph.
    pub glyph_ratio: f32,
    /// Target width / height ratio of the rendered picture.
    pub target_aspect: f32,
    pub min_columns: u16,
    pub max_columns: u16,
    pub min_rows: u16,
    pub max_rows: u16,
    /// Fraction of the viewport the grid may cover.
    pub padding: f32,
    pub min_font_px: f32,
    pub max_font_px: Option<f32>,
    /// Line height as a multiple of the font size.
    pub line_height_scale: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            char_width_px: 6.0,
            char_height_px: 10.0,
            glyph_ratio: 0.55,
            target_aspect: 4.0 / 3.0,
            min_columns: 80,
            max_columns: 140,
            min_rows: 36,
            max_rows: 100,
            padding: 0.9,
            min_font_px: 4.0,
            max_font_px: None,
            line_height_scale: 1.0,
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), Error> {
        let positive = [
            ("char_width_px", self.char_width_px),
            ("char_height_px", self.char_height_px),
            ("glyph_ratio", self.glyph_ratio),
            ("target_aspect", self.target_aspect),
            ("min_font_px", self.min_font_px),
            ("line_height_scale", self.line_height_scale),
        ];
        let invalid = positive.iter().find(|(_, value)| !(value.is_finite() && *value > 0.0));
        if let Some((name, _)) = invalid {
            return Err(Error::InvalidLayout(format!("{name} must be a positive number")));
        }

        if !(self.padding > 0.0 && self.padding <= 1.0) {
            return Err(Error::InvalidLayout("padding must be in (0, 1]".into()));
        }

        if self.min_columns == 0 || self.min_rows == 0 {
            return Err(Error::InvalidLayout("grid bounds must be at least one cell".into()));
        }

        if self.min_columns > self.max_columns || self.min_rows > self.max_rows {
            return Err(Error::InvalidLayout("minimum grid bound exceeds maximum".into()));
        }

        if let Some(max_font) = self.max_font_px {
            if !(max_font >= self.min_font_px) {
                return Err(Error::InvalidLayout("max_font_px is below min_font_px".into()));
            }
        }

        Ok(())
    }

    /// Width / height ratio of the grid in cells that shows `target_aspect` on screen.
    pub fn grid_ratio(&self) -> f32 {
        self.target_aspect / self.glyph_ratio
    }
}

/// Computes grid dimensions and font size that best fit a viewport.
#[derive(Clone, Copy, Debug, Default)]
pub struct SizeAdapter {
    config: LayoutConfig,
}

impl SizeAdapter {
    pub fn new(config: LayoutConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn fit(&self, viewport: Viewport) -> GridLayout {
        let (columns, rows) = self.grid_size(viewport);
        let font_size = self.font_size(viewport, columns, rows);

        GridLayout {
            columns,
            rows,
            font_size,
            line_height: font_size * self.config.line_height_scale,
        }
    }

    fn grid_size(&self, viewport: Viewport) -> (u16, u16) {
        let config = &self.config;
        let ratio = config.grid_ratio();

        let max_columns = (viewport.width as f32 / config.char_width_px).floor();
        let max_rows = (viewport.height as f32 / config.char_height_px).floor();
        let column_bound = f32::from(config.max_columns);
        let row_bound = f32::from(config.max_rows);

        let (mut columns, mut rows) = if max_rows <= 0.0 || max_columns / max_rows > ratio {
            // Viewport is wider than the target, height limits the grid.
            let rows = max_rows.min(row_bound);
            ((rows * ratio).floor(), rows)
        } else {
            let columns = max_columns.min(column_bound);
            (columns, (columns / ratio).floor())
        };

        if columns > column_bound {
            columns = column_bound;
            rows = (columns / ratio).floor();
        }
        if rows > row_bound {
            rows = row_bound;
            columns = (rows * ratio).floor().min(column_bound);
        }

        let columns = (columns as u16).clamp(config.min_columns, config.max_columns);
        let rows = (rows as u16).clamp(config.min_rows, config.max_rows);
        (columns, rows)
    }

    fn font_size(&self, viewport: Viewport, columns: u16, rows: u16) -> f32 {
        let config = &self.config;
        let by_width = viewport.width as f32 * config.padding
            / (f32::from(columns) * config.glyph_ratio);
        let by_height = viewport.height as f32 * config.padding / f32::from(rows);

        let font_size = by_width.min(by_height).max(config.min_font_px);
        match config.max_font_px {
            Some(max_font) => font_size.min(max_font),
            None => font_size,
        }
    }
}
