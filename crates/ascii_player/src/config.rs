use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use ascii_video::RendererConfig;
use serde::Deserialize;

/// Media played when no input is given.
pub const DEFAULT_INPUT: &str = "res/video.mp4";

/// Top-level configuration of the player.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    pub video: VideoConfig,
    pub audio: AudioConfig,
    pub terminal: TerminalConfig,
    pub render: RendererConfig,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VideoConfig {
    pub path: PathBuf,
    /// Size frames are decoded at before being sampled down to the grid.
    pub decode_width: u32,
    pub decode_height: u32,
    pub decode_fps: f32,
    /// Start playing as soon as the terminal is set up.
    pub autoplay: bool,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_INPUT),
            decode_width: 320,
            decode_height: 240,
            decode_fps: 30.0,
            autoplay: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AudioConfig {
    pub enabled: bool,
    /// Playback volume from 0.0 to 1.0.
    pub volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { enabled: true, volume: 1.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TerminalConfig {
    pub tick_interval_ms: u64,
    pub resize_debounce_ms: u64,
    /// Cell size assumed when the terminal does not report its pixel size.
    pub cell_width_px: f32,
    pub cell_height_px: f32,
    /// Fit the grid to the measured terminal cells instead of the configured glyph metrics.
    pub measure_cells: bool,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 16,
            resize_debounce_ms: 100,
            cell_width_px: 8.0,
            cell_height_px: 16.0,
            measure_cells: true,
        }
    }
}

impl TerminalConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}

impl PlayerConfig {
    /// Load a TOML configuration file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        let video = &self.video;
        if video.decode_width == 0 || video.decode_height == 0 {
            bail!("video decode size must be non-zero");
        }
        if !(video.decode_fps.is_finite() && video.decode_fps > 0.0) {
            bail!("video decode_fps must be positive, got {}", video.decode_fps);
        }

        if !(0.0..=1.0).contains(&self.audio.volume) {
            bail!("audio volume must be between 0.0 and 1.0, got {}", self.audio.volume);
        }

        let terminal = &self.terminal;
        if terminal.tick_interval_ms == 0 {
            bail!("terminal tick_interval_ms must be positive");
        }
        if !(terminal.cell_width_px > 0.0 && terminal.cell_height_px > 0.0) {
            bail!("terminal cell size must be positive");
        }

        self.render.validate().context("invalid [render] section")
    }
}
