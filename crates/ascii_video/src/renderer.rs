//! The single component tying media, sampler, output and playback together.

use std::time::Instant;

use log::{debug, info, warn};

use crate::config::RendererConfig;
use crate::layout::{GridLayout, SizeAdapter, Viewport};
use crate::media::MediaSource;
use crate::output::OutputSurface;
use crate::playback::{Playback, PlaybackState, TickHandle, TickScheduler};
use crate::sampler::FrameSampler;
use crate::{Error, Result};

pub const LOADING_MESSAGE: &str =
    "ASCII video player\n\nLoading...\n\nClick or press space to play/pause\n(with audio)";

pub const READY_MESSAGE: &str =
    "ASCII video player\n\nReady!\n\nClick or press space to start playback\n(plays with audio)";

pub const PLAY_BLOCKED_MESSAGE: &str =
    "Click or press space to start playback!\n(the video could not be started)";

/// Renders a media source as ASCII art while it plays.
///
/// All state lives here and is mutated synchronously by the caller's event loop: user toggles,
/// viewport resizes and ticks handed out by the scheduler.
pub struct Renderer<M, O, S> {
    media: M,
    output: O,
    scheduler: S,
    adapter: SizeAdapter,
    sampler: FrameSampler,
    playback: Playback,
    layout: GridLayout,
    ready_announced: bool,
}

impl<M, O, S> Renderer<M, O, S>
where
    M: MediaSource,
    O: OutputSurface,
    S: TickScheduler,
{
    pub fn new(
        config: RendererConfig,
        media: M,
        mut output: O,
        scheduler: S,
        viewport: Viewport,
    ) -> Result<Self> {
        config.validate()?;

        let adapter = SizeAdapter::new(config.layout)?;
        let layout = adapter.fit(viewport);
        debug!(
            "initial grid {}x{} at {:.1}px for viewport {}x{}",
            layout.columns, layout.rows, layout.font_size, viewport.width, viewport.height
        );

        output.apply_layout(&layout)?;
        output.set_text(LOADING_MESSAGE)?;

        let sampler =
            FrameSampler::new(layout.columns, layout.rows, config.ramp, config.frame_rate);

        Ok(Self {
            media,
            output,
            scheduler,
            adapter,
            sampler,
            playback: Playback::default(),
            layout,
            ready_announced: false,
        })
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn layout(&self) -> GridLayout {
        self.layout
    }

    pub fn state(&self) -> PlaybackState {
        self.playback.state()
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    pub fn armed_tick(&self) -> Option<TickHandle> {
        self.playback.armed_tick()
    }

    /// Show the ready message once the media can display its first frame.
    ///
    /// Only happens once, and never after playback was started.
    pub fn poll_ready(&mut self) -> Result<bool> {
        if self.ready_announced || self.playback.is_playing() || !self.media.is_ready() {
            return Ok(false);
        }

        self.ready_announced = true;
        self.output.set_text(READY_MESSAGE)?;
        info!("media ready");
        Ok(true)
    }

    /// Refit the grid to a new viewport. Playback state is left untouched.
    pub fn resize(&mut self, viewport: Viewport) -> Result<()> {
        let layout = self.adapter.fit(viewport);
        if layout == self.layout {
            return Ok(());
        }

        debug!(
            "grid {}x{} -> {}x{} ({:.1}px) for viewport {}x{}",
            self.layout.columns,
            self.layout.rows,
            layout.columns,
            layout.rows,
            layout.font_size,
            viewport.width,
            viewport.height
        );

        self.layout = layout;
        self.sampler.resize(layout.columns, layout.rows);
        self.output.apply_layout(&layout)?;
        Ok(())
    }

    /// Flip between playing and paused. Returns the new state.
    pub fn toggle(&mut self, now: Instant) -> Result<PlaybackState> {
        if self.playback.is_playing() {
            self.pause(now);
        } else {
            self.play(now)?;
        }

        Ok(self.playback.state())
    }

    /// Start playing and arm the render loop.
    ///
    /// If the media refuses to start, the flag stays on playing and the instructional message
    /// replaces the output; ticks then idle until the media advances or the user toggles again.
    pub fn play(&mut self, now: Instant) -> Result<()> {
        if !self.playback.start(&mut self.scheduler) {
            return Ok(());
        }

        self.ready_announced = true;
        self.sampler.throttle_mut().reset();

        match self.media.play(now) {
            Ok(()) => info!("playback started"),
            Err(err) => {
                warn!("media refused to play: {err}");
                self.output.set_text(PLAY_BLOCKED_MESSAGE)?;
            },
        }

        Ok(())
    }

    /// Pause the media and cancel the pending tick.
    pub fn pause(&mut self, now: Instant) {
        if self.playback.stop(&mut self.scheduler) {
            self.media.pause(now);
            info!("playback paused");
        }
    }

    /// Run one tick of the render loop.
    pub fn tick(&mut self, handle: TickHandle, now: Instant) -> Result<()> {
        if !self.playback.fire(handle) {
            debug!("ignoring stale tick {}", handle.id());
            return Ok(());
        }

        if self.media.has_ended() {
            self.playback.stop(&mut self.scheduler);
            self.media.pause(now);
            info!("playback reached the end");
            return Ok(());
        }

        // The throttle only counts ticks that had a frame to draw.
        let written = if self.media.is_paused() {
            Ok(())
        } else {
            match self.media.current_frame(now) {
                Some(frame) if self.sampler.throttle_mut().ready(now) => {
                    let text = self.sampler.sample(frame);
                    self.output.set_text(text)
                },
                _ => Ok(()),
            }
        };

        self.playback.rearm(&mut self.scheduler);
        written.map_err(Error::from)
    }
}
