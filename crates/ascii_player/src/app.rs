//! The event loop driving the renderer.

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use ascii_video::Renderer;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use log::{debug, info};

use crate::config::{PlayerConfig, TerminalConfig};
use crate::source::Source;
use crate::terminal::{TerminalGuard, TerminalSurface, WindowMetrics};
use crate::timer::FrameTimer;

/// Longest wait for input while nothing is scheduled, so readiness is noticed promptly.
const IDLE_POLL: Duration = Duration::from_millis(50);

type Player = Renderer<Source, TerminalSurface<Stdout>, FrameTimer>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Toggle,
    Quit,
    Resize(u16, u16),
}

/// Map a terminal event to what the player does with it.
pub fn action_for(event: &Event) -> Option<Action> {
    match event {
        Event::Key(key) => key_action(key),
        Event::Mouse(MouseEvent { kind: MouseEventKind::Down(MouseButton::Left), .. }) => {
            Some(Action::Toggle)
        },
        Event::Resize(columns, rows) => Some(Action::Resize(*columns, *rows)),
        _ => None,
    }
}

fn key_action(key: &KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    match key.code {
        KeyCode::Char(' ') => Some(Action::Toggle),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}

/// Delays viewport changes until resizing settled.
#[derive(Debug)]
pub struct ResizeDebounce {
    delay: Duration,
    pending: Option<Instant>,
}

impl ResizeDebounce {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    /// Restart the wait on every resize event.
    pub fn schedule(&mut self, now: Instant) {
        self.pending = Some(now + self.delay);
    }

    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(deadline) if deadline <= now => {
                self.pending = None;
                true
            },
            _ => false,
        }
    }

    pub fn timeout(&self, now: Instant) -> Option<Duration> {
        self.pending.map(|deadline| deadline.saturating_duration_since(now))
    }
}

/// Take over the terminal and play until the user quits.
pub fn run(mut config: PlayerConfig) -> Result<()> {
    let metrics =
        WindowMetrics::measure(&config.terminal).context("failed to query terminal size")?;
    if config.terminal.measure_cells {
        metrics.apply_to(&mut config.render.layout);
    }
    debug!("terminal metrics {metrics:?}");

    let media = Source::open(&config.video, &config.audio)?;

    let mut guard = TerminalGuard::enter().context("failed to set up terminal")?;
    let surface = TerminalSurface::new(io::stdout(), metrics.columns, metrics.rows);
    let timer = FrameTimer::new(config.terminal.tick_interval());
    let mut player = Renderer::new(config.render, media, surface, timer, metrics.viewport())
        .context("failed to create renderer")?;

    if config.video.autoplay {
        player.play(Instant::now())?;
    }

    let mut resize = ResizeDebounce::new(config.terminal.resize_debounce());
    event_loop(&mut player, &mut resize, &config.terminal)?;

    guard.exit().context("failed to restore terminal")?;
    info!("exiting");
    Ok(())
}

fn event_loop(
    player: &mut Player,
    resize: &mut ResizeDebounce,
    terminal: &TerminalConfig,
) -> Result<()> {
    loop {
        player.poll_ready()?;

        let now = Instant::now();
        if let Some(handle) = player.scheduler_mut().take_due(now) {
            player.tick(handle, now)?;
        }

        if resize.take_due(now) {
            let metrics = WindowMetrics::measure(terminal)?;
            player.output_mut().set_window(metrics.columns, metrics.rows)?;
            player.resize(metrics.viewport())?;
        }

        let now = Instant::now();
        let timeout = [player.scheduler().timeout(now), resize.timeout(now)]
            .into_iter()
            .flatten()
            .fold(IDLE_POLL, Duration::min);

        if !event::poll(timeout)? {
            continue;
        }

        match action_for(&event::read()?) {
            Some(Action::Toggle) => {
                let state = player.toggle(Instant::now())?;
                debug!("toggled to {state:?}");
            },
            Some(Action::Quit) => {
                player.pause(Instant::now());
                return Ok(());
            },
            Some(Action::Resize(columns, rows)) => {
                debug!("terminal resized to {columns}x{rows}");
                resize.schedule(Instant::now());
            },
            None => (),
        }
    }
}
