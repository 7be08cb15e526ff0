use super::gradient::Gradient;

/// Bytes per pixel in the RGBA buffers read back from the sampling surface.
pub const BYTES_PER_PIXEL: usize = 4;

#[derive(Clone, Debug, Default)]
pub struct GlyphMapper {
    gradient: Gradient,
}

impl GlyphMapper {
    pub fn new(gradient: Gradient) -> Self {
        Self { gradient }
    }

    /// Write the text block for a row-major RGBA buffer straight into `out`.
    ///
    /// `out` is cleared first; every row, including the last, ends with `\n`. Alpha is ignored.
    pub fn write_rgba_text(&self, pixels: &[u8], width: u16, height: u16, out: &mut String) {
        out.clear();

        let width = usize::from(width);
        let height = usize::from(height);
        if width == 0 || height == 0 {
            return;
        }

        let chars = self.gradient.chars();
        let row_bytes = width * BYTES_PER_PIXEL;
        out.reserve((width + 1) * height);

        for row in pixels.chunks_exact(row_bytes).take(height) {
            for px in row.chunks_exact(BYTES_PER_PIXEL) {
                out.push(chars[self.gradient.index_of_rgb(px[0], px[1], px[2])]);
            }
            out.push('\n');
        }
    }
}
