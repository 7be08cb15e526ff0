use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use log::{debug, warn};

/// Soundtrack of the media file, played by an `ffplay` child process.
///
/// Pausing suspends the process so audio resumes exactly where it stopped.
#[derive(Debug)]
pub struct AudioTrack {
    path: PathBuf,
    volume: f32,
    child: Option<Child>,
    suspended: bool,
}

impl AudioTrack {
    pub fn new(path: &Path, volume: f32) -> Self {
        Self { path: path.to_path_buf(), volume, child: None, suspended: false }
    }

    /// Whether `ffplay` can be started.
    pub fn available() -> bool {
        Command::new("ffplay")
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Start the soundtrack, or continue it after a pause.
    pub fn play(&mut self) -> io::Result<()> {
        match &self.child {
            Some(child) if self.suspended => {
                signal::resume(child)?;
                self.suspended = false;
            },
            Some(_) => (),
            None => {
                let child = Command::new("ffplay")
                    .args(ffplay_args(&self.path, self.volume))
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn()?;
                debug!("started ffplay with pid {}", child.id());
                self.child = Some(child);
                self.suspended = false;
            },
        }

        Ok(())
    }

    pub fn pause(&mut self) {
        let Some(child) = &self.child else { return };
        if self.suspended {
            return;
        }

        match signal::suspend(child) {
            Ok(()) => self.suspended = true,
            Err(err) => warn!("failed to pause audio: {err}"),
        }
    }

    pub fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            // A suspended process still dies on SIGKILL.
            let _ = child.kill();
            let _ = child.wait();
        }
        self.suspended = false;
    }
}

impl Drop for AudioTrack {
    fn drop(&mut self) {
        self.stop();
    }
}

fn ffplay_args(path: &Path, volume: f32) -> Vec<String> {
    let volume = (volume.clamp(0.0, 1.0) * 100.0).round() as u32;
    vec![
        "-nodisp".into(),
        "-autoexit".into(),
        "-loglevel".into(),
        "quiet".into(),
        "-volume".into(),
        volume.to_string(),
        path.to_string_lossy().into_owned(),
    ]
}

#[cfg(unix)]
mod signal {
    use std::io;
    use std::process::Child;

    pub fn suspend(child: &Child) -> io::Result<()> {
        send(child, libc::SIGSTOP)
    }

    pub fn resume(child: &Child) -> io::Result<()> {
        send(child, libc::SIGCONT)
    }

    fn send(child: &Child, signal: libc::c_int) -> io::Result<()> {
        let pid = child.id() as libc::pid_t;

        // SAFETY: `pid` belongs to a child we have not reaped yet.
        if unsafe { libc::kill(pid, signal) } == -1 {
            return Err(io::Error::last_os_error());
        }

        Ok(())
    }
}

#[cfg(not(unix))]
mod signal {
    use std::io;
    use std::process::Child;

    pub fn suspend(_child: &Child) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "audio cannot be paused on this platform"))
    }

    pub fn resume(_child: &Child) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "audio cannot be resumed on this platform"))
    }
}
