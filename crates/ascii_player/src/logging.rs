//! Logging to a file.
//!
//! The terminal is taken over by the player, so log records can't go to stderr while it runs.

use std::env;
use std::fs::{File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{LevelFilter, Log, Metadata, Record};

/// Crates whose records are written to the log.
const ALLOWED_TARGETS: [&str; 2] = ["ascii_player", "ascii_video"];

/// Map the `-v` count and `--quiet` flag to a level filter.
pub fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Off;
    }

    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the file logger. Returns the path of the log file, if logging is enabled.
///
/// The file is only created once the first record passes the level filter.
pub fn initialize(level: LevelFilter, path: Option<PathBuf>) -> Result<Option<PathBuf>> {
    if level == LevelFilter::Off {
        return Ok(None);
    }

    let path = path.unwrap_or_else(default_log_path);
    let logger = Logger::new(path.clone(), level);

    log::set_boxed_logger(Box::new(logger)).context("logger was already initialized")?;
    log::set_max_level(level);

    Ok(Some(path))
}

fn default_log_path() -> PathBuf {
    env::temp_dir().join(format!("ascii_player-{}.log", process::id()))
}

pub struct Logger {
    level: LevelFilter,
    path: PathBuf,
    file: Mutex<Option<LineWriter<File>>>,
    start: Instant,
}

impl Logger {
    fn new(path: PathBuf, level: LevelFilter) -> Self {
        Self { level, path, file: Mutex::new(None), start: Instant::now() }
    }

    fn format(&self, record: &Record<'_>) -> String {
        let elapsed = self.start.elapsed().as_secs_f64();
        format!(
            "[{elapsed:.6}s] [{:<5}] [{}] {}\n",
            record.level(),
            record.target(),
            record.args()
        )
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level && is_allowed_target(metadata.target())
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let message = self.format(record);

        // A poisoned lock only means another thread panicked mid-write.
        let mut file = match self.file.lock() {
            Ok(file) => file,
            Err(poisoned) => poisoned.into_inner(),
        };

        if file.is_none() {
            match open_log_file(&self.path) {
                Ok(opened) => *file = Some(LineWriter::new(opened)),
                // Nowhere left to report this while the terminal is taken over.
                Err(_) => return,
            }
        }

        if let Some(file) = file.as_mut() {
            let _ = file.write_all(message.as_bytes());
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            if let Some(file) = file.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn is_allowed_target(target: &str) -> bool {
    let crate_name = target.split("::").next().unwrap_or(target);
    ALLOWED_TARGETS.contains(&crate_name)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use log::Level;

    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_filter(0, false), LevelFilter::Warn);
        assert_eq!(level_filter(1, false), LevelFilter::Info);
        assert_eq!(level_filter(2, false), LevelFilter::Debug);
        assert_eq!(level_filter(7, false), LevelFilter::Trace);
        assert_eq!(level_filter(3, true), LevelFilter::Off);
    }

    #[test]
    fn only_own_crates_are_logged() {
        assert!(is_allowed_target("ascii_video::renderer"));
        assert!(is_allowed_target("ascii_player"));
        assert!(!is_allowed_target("mio::poll"));
        assert!(!is_allowed_target("ascii_videos"));
    }

    #[test]
    fn file_is_created_by_first_enabled_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("player.log");
        let logger = Logger::new(path.clone(), LevelFilter::Info);

        logger.log(
            &Record::builder()
                .args(format_args!("too chatty"))
                .level(Level::Debug)
                .target("ascii_video::renderer")
                .build(),
        );
        logger.flush();
        assert!(!path.exists());

        logger.log(
            &Record::builder()
                .args(format_args!("media ready"))
                .level(Level::Info)
                .target("ascii_video::renderer")
                .build(),
        );
        logger.log(
            &Record::builder()
                .args(format_args!("too chatty"))
                .level(Level::Debug)
                .target("ascii_video::renderer")
                .build(),
        );
        logger.log(
            &Record::builder()
                .args(format_args!("foreign"))
                .level(Level::Warn)
                .target("mio")
                .build(),
        );
        logger.flush();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert!(contents.contains("[INFO ] [ascii_video::renderer] media ready"));
    }
}
