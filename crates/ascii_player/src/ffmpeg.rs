//! Video decoding through an `ffmpeg` child process.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use ascii_video::{MediaSource, PlaybackClock, PlaybackError};
use image::RgbaImage;
use log::{debug, info, warn};

use crate::audio::AudioTrack;

/// Decoded frames buffered ahead of the playback position.
const FRAME_BUFFER: usize = 8;

/// Check that `ffmpeg` is installed, returning its version line.
pub fn probe() -> io::Result<String> {
    let output = Command::new("ffmpeg").arg("-version").stdin(Stdio::null()).output()?;
    if !output.status.success() {
        return Err(io::Error::new(io::ErrorKind::Other, "ffmpeg -version failed"));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout.lines().next().unwrap_or_default().to_owned())
}

#[derive(Clone, Debug, PartialEq)]
pub struct DecodeSettings {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps: f32,
}

impl DecodeSettings {
    fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    fn args(&self) -> Vec<String> {
        vec![
            "-loglevel".into(),
            "error".into(),
            "-nostdin".into(),
            "-i".into(),
            self.path.to_string_lossy().into_owned(),
            "-an".into(),
            "-vf".into(),
            format!("fps={},scale={}:{}", self.fps, self.width, self.height),
            "-f".into(),
            "rawvideo".into(),
            "-pix_fmt".into(),
            "rgba".into(),
            "pipe:1".into(),
        ]
    }

    /// Index of the frame shown at `position`.
    fn frame_at(&self, position: Duration) -> u64 {
        (position.as_secs_f64() * f64::from(self.fps)).floor() as u64
    }
}

/// Raw frames arriving from a decoder thread.
struct FrameStream {
    child: Option<Child>,
    frames: Receiver<RgbaImage>,
    ready: Arc<AtomicBool>,
}

impl FrameStream {
    fn spawn(settings: &DecodeSettings) -> io::Result<Self> {
        let mut child = Command::new("ffmpeg")
            .args(settings.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "ffmpeg stdout missing"))?;

        let (sender, frames) = mpsc::sync_channel(FRAME_BUFFER);
        let ready = Arc::new(AtomicBool::new(false));

        let reader_ready = ready.clone();
        let (width, height, frame_len) = (settings.width, settings.height, settings.frame_len());
        thread::Builder::new().name("ffmpeg-reader".into()).spawn(move || {
            read_frames(stdout, sender, reader_ready, width, height, frame_len)
        })?;

        debug!("spawned ffmpeg with pid {} for {}", child.id(), settings.path.display());
        Ok(Self { child: Some(child), frames, ready })
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

impl Drop for FrameStream {
    fn drop(&mut self) {
        // The reader thread exits once the channel or the pipe closes.
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn read_frames(
    mut stdout: ChildStdout,
    sender: SyncSender<RgbaImage>,
    ready: Arc<AtomicBool>,
    width: u32,
    height: u32,
    frame_len: usize,
) {
    let mut count = 0u64;
    loop {
        let mut buffer = vec![0; frame_len];
        if let Err(err) = stdout.read_exact(&mut buffer) {
            if err.kind() != io::ErrorKind::UnexpectedEof {
                warn!("failed to read from ffmpeg: {err}");
            }
            break;
        }

        let Some(frame) = RgbaImage::from_raw(width, height, buffer) else { break };
        if sender.send(frame).is_err() {
            break;
        }

        count += 1;
        ready.store(true, Ordering::Release);
    }

    debug!("ffmpeg reader finished after {count} frames");
}

/// Video file decoded by `ffmpeg`, with an optional soundtrack.
pub struct FfmpegVideo {
    settings: DecodeSettings,
    stream: Option<FrameStream>,
    audio: Option<AudioTrack>,
    clock: PlaybackClock,
    frame: Option<RgbaImage>,
    frame_index: Option<u64>,
    ended: bool,
}

impl FfmpegVideo {
    /// Start decoding right away so the first frame is ready before playback.
    pub fn open(settings: DecodeSettings, audio: Option<AudioTrack>) -> io::Result<Self> {
        let stream = FrameStream::spawn(&settings)?;
        Ok(Self {
            settings,
            stream: Some(stream),
            audio,
            clock: PlaybackClock::new(),
            frame: None,
            frame_index: None,
            ended: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.settings.path
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    fn rewind(&mut self) -> io::Result<()> {
        self.stream = None;
        self.clock.reset();
        self.frame = None;
        self.frame_index = None;
        self.ended = false;
        self.stream = Some(FrameStream::spawn(&self.settings)?);

        if let Some(audio) = &mut self.audio {
            audio.stop();
        }

        Ok(())
    }

    fn finish(&mut self, now: Instant) {
        self.ended = true;
        self.clock.pause(now);
        if let Some(audio) = &mut self.audio {
            audio.stop();
        }
        info!("video ended after {:.2}s", self.clock.position(now).as_secs_f64());
    }

    /// Consume decoded frames up to the playback position.
    fn advance(&mut self, now: Instant) {
        let Some(stream) = &self.stream else { return };
        let target = self.settings.frame_at(self.clock.position(now));

        let mut disconnected = false;
        while self.frame_index.map_or(true, |index| index < target) {
            match stream.frames.try_recv() {
                Ok(frame) => {
                    self.frame = Some(frame);
                    self.frame_index = Some(self.frame_index.map_or(0, |index| index + 1));
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                },
            }
        }

        if disconnected {
            self.finish(now);
        }
    }
}

impl MediaSource for FfmpegVideo {
    fn play(&mut self, now: Instant) -> Result<(), PlaybackError> {
        if self.ended || self.stream.is_none() {
            self.rewind()?;
        }

        self.clock.resume(now);

        if let Some(audio) = &mut self.audio {
            if let Err(err) = audio.play() {
                warn!("disabling audio, ffplay failed to start: {err}");
                self.audio = None;
            }
        }

        Ok(())
    }

    fn pause(&mut self, now: Instant) {
        self.clock.pause(now);
        if let Some(audio) = &mut self.audio {
            audio.pause();
        }
    }

    fn is_paused(&self) -> bool {
        !self.clock.is_running()
    }

    fn has_ended(&self) -> bool {
        self.ended
    }

    fn is_ready(&self) -> bool {
        self.frame.is_some() || self.stream.as_ref().is_some_and(FrameStream::is_ready)
    }

    fn current_frame(&mut self, now: Instant) -> Option<&RgbaImage> {
        if !self.ended && self.clock.is_running() {
            self.advance(now);
        }

        self.frame.as_ref()
    }
}
