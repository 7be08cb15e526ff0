use std::io;

use crate::layout::GridLayout;

/// Text-bearing surface the rendered frames and status messages are written to.
pub trait OutputSurface {
    /// Replace the whole text content in one write.
    fn set_text(&mut self, text: &str) -> io::Result<()>;

    /// Adopt new grid dimensions and font metrics, keeping the grid centered.
    fn apply_layout(&mut self, layout: &GridLayout) -> io::Result<()>;
}
