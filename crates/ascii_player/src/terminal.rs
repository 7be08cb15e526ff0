//! Terminal setup and the text surface frames are drawn on.

use std::io::{self, Write};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

use ascii_video::{GridLayout, LayoutConfig, OutputSurface, Viewport};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::style::Print;
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, WindowSize,
};
use crossterm::{execute, queue};
use log::debug;

use crate::config::TerminalConfig;

/// Whether the terminal is currently taken over, for the panic hook.
static TERMINAL_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Raw mode, alternate screen and mouse capture, restored on drop.
pub struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        install_panic_hook();

        terminal::enable_raw_mode()?;
        TERMINAL_ACTIVE.store(true, Ordering::SeqCst);
        let guard = Self { active: true };

        execute!(
            io::stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            Hide,
            Clear(ClearType::All)
        )?;
        Ok(guard)
    }

    pub fn exit(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }

        self.active = false;
        restore()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = self.exit();
    }
}

fn restore() -> io::Result<()> {
    TERMINAL_ACTIVE.store(false, Ordering::SeqCst);
    execute!(io::stdout(), Show, DisableMouseCapture, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()
}

fn install_panic_hook() {
    static HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);
    if HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }

    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if TERMINAL_ACTIVE.load(Ordering::SeqCst) {
            let _ = restore();
        }
        default_hook(info);
    }));
}

/// Terminal size in cells plus the pixel size of one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowMetrics {
    pub columns: u16,
    pub rows: u16,
    pub cell_width: f32,
    pub cell_height: f32,
}

impl WindowMetrics {
    /// Query the terminal, falling back to the configured cell size when it reports no pixels.
    pub fn measure(config: &TerminalConfig) -> io::Result<Self> {
        match terminal::window_size() {
            Ok(size) => Ok(Self::from_window_size(size, config)),
            Err(err) => {
                debug!("window_size unavailable ({err}), using cell count only");
                let (columns, rows) = terminal::size()?;
                Ok(Self::from_cells(columns, rows, config))
            },
        }
    }

    fn from_window_size(size: WindowSize, config: &TerminalConfig) -> Self {
        let mut metrics = Self::from_cells(size.columns, size.rows, config);
        if size.width > 0 && size.height > 0 && metrics.columns > 0 && metrics.rows > 0 {
            metrics.cell_width = f32::from(size.width) / f32::from(metrics.columns);
            metrics.cell_height = f32::from(size.height) / f32::from(metrics.rows);
        }
        metrics
    }

    fn from_cells(columns: u16, rows: u16, config: &TerminalConfig) -> Self {
        Self {
            columns,
            rows,
            cell_width: config.cell_width_px,
            cell_height: config.cell_height_px,
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            (f32::from(self.columns) * self.cell_width) as u32,
            (f32::from(self.rows) * self.cell_height) as u32,
        )
    }

    /// Make the layout's glyph metrics match this terminal's cells.
    pub fn apply_to(&self, layout: &mut LayoutConfig) {
        layout.char_width_px = self.cell_width;
        layout.char_height_px = self.cell_height;
        layout.glyph_ratio = self.cell_width / self.cell_height;
    }
}

/// Draws text blocks centered in the terminal window.
pub struct TerminalSurface<W: Write> {
    out: W,
    columns: u16,
    rows: u16,
    text: String,
    drawn_lines: usize,
    drawn_width: usize,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, columns: u16, rows: u16) -> Self {
        Self {
            out,
            columns,
            rows,
            text: String::new(),
            drawn_lines: 0,
            drawn_width: 0,
        }
    }

    /// Terminal window changed size.
    pub fn set_window(&mut self, columns: u16, rows: u16) -> io::Result<()> {
        self.columns = columns;
        self.rows = rows;
        self.redraw(true)
    }

    fn redraw(&mut self, clear: bool) -> io::Result<()> {
        let lines = self.text.lines().count();
        let width = self.text.lines().map(|line| line.chars().count()).max().unwrap_or(0);

        // Leftovers of a larger or differently shaped block would stay on screen otherwise.
        if clear || (lines, width) != (self.drawn_lines, self.drawn_width) {
            queue!(self.out, Clear(ClearType::All))?;
        }

        let columns = usize::from(self.columns);
        let rows = usize::from(self.rows);
        let top = rows.saturating_sub(lines) / 2;

        for (row, line) in self.text.lines().take(rows).enumerate() {
            let line_width = line.chars().count();
            let left = columns.saturating_sub(line_width) / 2;
            let visible: String = if line_width > columns {
                line.chars().take(columns).collect()
            } else {
                line.to_owned()
            };

            queue!(self.out, MoveTo(left as u16, (top + row) as u16), Print(visible))?;
        }

        self.drawn_lines = lines;
        self.drawn_width = width;
        self.out.flush()
    }
}

impl<W: Write> OutputSurface for TerminalSurface<W> {
    fn set_text(&mut self, text: &str) -> io::Result<()> {
        self.text.clear();
        self.text.push_str(text);
        self.redraw(false)
    }

    fn apply_layout(&mut self, layout: &GridLayout) -> io::Result<()> {
        debug!(
            "terminal {}x{} showing grid {}x{}",
            self.columns, self.rows, layout.columns, layout.rows
        );
        self.redraw(true)
    }
}
