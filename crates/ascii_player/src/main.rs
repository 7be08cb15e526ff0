use std::path::PathBuf;

use anyhow::{Context, Result};
use ascii_video::Gradient;
use clap::{ArgAction, Parser, ValueEnum};
use log::{error, info};

mod app;
mod audio;
mod config;
mod ffmpeg;
mod logging;
mod source;
mod terminal;
mod timer;

use crate::config::PlayerConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "Play a video as live ASCII art in the terminal")]
struct Cli {
    /// Video, GIF or image to play [default: res/video.mp4]
    input: Option<PathBuf>,
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Gradient preset used to map brightness to glyphs
    #[arg(long, value_enum)]
    gradient: Option<GradientPreset>,
    /// Custom glyphs from darkest to brightest, overrides --gradient
    #[arg(long, conflicts_with = "gradient")]
    ramp: Option<String>,
    /// Cap on rendered frames per second
    #[arg(long)]
    fps: Option<f32>,
    /// Play without audio
    #[arg(long)]
    mute: bool,
    /// Audio volume (0.0 - 1.0)
    #[arg(long)]
    volume: Option<f32>,
    /// Start playing immediately
    #[arg(long)]
    autoplay: bool,
    /// Increase log verbosity, repeat for more
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Disable logging
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
    /// Log file [default: $TMPDIR/ascii_player-<pid>.log]
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum GradientPreset {
    Ramp,
    Detailed,
    Blocks,
    Binary,
}

impl GradientPreset {
    fn to_gradient(self) -> Gradient {
        match self {
            GradientPreset::Ramp => Gradient::ramp(),
            GradientPreset::Detailed => Gradient::detailed(),
            GradientPreset::Blocks => Gradient::blocks(),
            GradientPreset::Binary => Gradient::binary(),
        }
    }
}

impl Cli {
    /// Load the config file, if any, and apply command line overrides.
    fn player_config(&self) -> Result<PlayerConfig> {
        let mut config = match &self.config {
            Some(path) => PlayerConfig::load(path)?,
            None => PlayerConfig::default(),
        };

        if let Some(input) = &self.input {
            config.video.path = input.clone();
        }
        if let Some(preset) = self.gradient {
            config.render.ramp = preset.to_gradient();
        }
        if let Some(ramp) = &self.ramp {
            config.render.ramp = Gradient::parse(ramp).context("invalid --ramp")?;
        }
        if let Some(fps) = self.fps {
            config.render.frame_rate = Some(fps);
        }
        if self.mute {
            config.audio.enabled = false;
        }
        if let Some(volume) = self.volume {
            config.audio.volume = volume;
        }
        if self.autoplay {
            config.video.autoplay = true;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = logging::level_filter(cli.verbose, cli.quiet);
    let log_path = logging::initialize(level, cli.log_file.clone())?;

    let config = cli.player_config()?;
    info!("playing {} with ramp {:?}", config.video.path.display(), config.render.ramp.to_string());

    let result = app::run(config);
    if let Err(err) = &result {
        error!("{err:?}");
        if let Some(path) = log_path {
            eprintln!("See {} for details", path.display());
        }
    }

    result
}
