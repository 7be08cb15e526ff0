use std::io;
use std::time::{Duration, Instant};

use ascii_video::media::FrameSeries;
use ascii_video::{
    AnimationSource, GridLayout, LayoutConfig, MediaSource, OutputSurface, PlaybackError,
    PlaybackState, Renderer, RendererConfig, TickHandle, TickScheduler, Viewport,
    LOADING_MESSAGE, PLAY_BLOCKED_MESSAGE, READY_MESSAGE,
};
use image::{Rgba, RgbaImage};

#[derive(Default)]
struct FakeMedia {
    playing: bool,
    ended: bool,
    ready: bool,
    refuse: bool,
    frame: Option<RgbaImage>,
    play_calls: usize,
}

impl MediaSource for FakeMedia {
    fn play(&mut self, _now: Instant) -> Result<(), PlaybackError> {
        self.play_calls += 1;
        if self.refuse {
            return Err(PlaybackError::Refused("no user gesture".into()));
        }
        self.playing = true;
        self.ended = false;
        Ok(())
    }

    fn pause(&mut self, _now: Instant) {
        self.playing = false;
    }

    fn is_paused(&self) -> bool {
        !self.playing
    }

    fn has_ended(&self) -> bool {
        self.ended
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn current_frame(&mut self, _now: Instant) -> Option<&RgbaImage> {
        self.frame.as_ref()
    }
}

#[derive(Default)]
struct FakeOutput {
    texts: Vec<String>,
    layouts: Vec<GridLayout>,
}

impl FakeOutput {
    fn last_text(&self) -> &str {
        self.texts.last().map(String::as_str).unwrap_or_default()
    }
}

impl OutputSurface for FakeOutput {
    fn set_text(&mut self, text: &str) -> io::Result<()> {
        self.texts.push(text.to_owned());
        Ok(())
    }

    fn apply_layout(&mut self, layout: &GridLayout) -> io::Result<()> {
        self.layouts.push(*layout);
        Ok(())
    }
}

#[derive(Default)]
struct FakeScheduler {
    next_id: u64,
    pending: Option<TickHandle>,
    cancelled: Vec<TickHandle>,
}

impl TickScheduler for FakeScheduler {
    fn request_tick(&mut self) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle::new(self.next_id);
        self.pending = Some(handle);
        handle
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
        self.cancelled.push(handle);
    }
}

type TestRenderer<M = FakeMedia> = Renderer<M, FakeOutput, FakeScheduler>;

fn solid(value: u8) -> RgbaImage {
    RgbaImage::from_pixel(64, 48, Rgba([value, value, value, 255]))
}

fn renderer_with(media: FakeMedia, config: RendererConfig) -> TestRenderer {
    Renderer::new(
        config,
        media,
        FakeOutput::default(),
        FakeScheduler::default(),
        Viewport::new(1280, 720),
    )
    .unwrap()
}

fn renderer(media: FakeMedia) -> TestRenderer {
    renderer_with(media, RendererConfig::default())
}

/// Fire whatever tick is pending, as the event loop would.
fn run_tick<M: MediaSource>(renderer: &mut TestRenderer<M>, now: Instant) {
    if let Some(handle) = renderer.scheduler_mut().pending.take() {
        renderer.tick(handle, now).unwrap();
    }
}

fn expected_block(glyph: char, layout: GridLayout) -> String {
    let row: String = std::iter::repeat(glyph).take(usize::from(layout.columns)).collect();
    format!("{row}\n").repeat(usize::from(layout.rows))
}

#[test]
fn startup_fits_viewport_and_shows_loading() {
    let renderer = renderer(FakeMedia::default());
    let layout = renderer.layout();

    assert_eq!((layout.columns, layout.rows), (140, 57));
    assert_eq!(renderer.output().layouts, vec![layout]);
    assert_eq!(renderer.output().last_text(), LOADING_MESSAGE);
    assert_eq!(renderer.state(), PlaybackState::Paused);
    assert_eq!(renderer.armed_tick(), None);
}

#[test]
fn ready_message_is_shown_once_before_playback() {
    let mut renderer = renderer(FakeMedia::default());
    assert!(!renderer.poll_ready().unwrap());

    let mut renderer = self::renderer(FakeMedia { ready: true, ..FakeMedia::default() });
    assert!(renderer.poll_ready().unwrap());
    assert_eq!(renderer.output().last_text(), READY_MESSAGE);
    assert!(!renderer.poll_ready().unwrap());
    assert_eq!(renderer.output().texts.len(), 2);
}

#[test]
fn ready_message_never_overwrites_playback() {
    let now = Instant::now();
    let mut renderer = renderer(FakeMedia { ready: true, ..FakeMedia::default() });
    renderer.play(now).unwrap();
    renderer.pause(now);
    assert!(!renderer.poll_ready().unwrap());
}

#[test]
fn toggling_alternates_state() {
    let now = Instant::now();
    let mut renderer = renderer(FakeMedia::default());

    assert_eq!(renderer.toggle(now).unwrap(), PlaybackState::Playing);
    assert!(renderer.armed_tick().is_some());
    assert_eq!(renderer.toggle(now).unwrap(), PlaybackState::Paused);
    assert_eq!(renderer.armed_tick(), None);

    for _ in 0..5 {
        renderer.toggle(now).unwrap();
    }
    assert_eq!(renderer.state(), PlaybackState::Playing);
    assert!(renderer.media().playing);
}

#[test]
fn tick_renders_current_frame_and_rearms() {
    let now = Instant::now();
    let media = FakeMedia { frame: Some(solid(0)), ..FakeMedia::default() };
    let mut renderer = renderer(media);
    renderer.play(now).unwrap();

    run_tick(&mut renderer, now);

    let layout = renderer.layout();
    assert_eq!(renderer.output().last_text(), expected_block(' ', layout));
    assert!(renderer.armed_tick().is_some());
    assert_eq!(renderer.armed_tick(), renderer.scheduler().pending);
}

#[test]
fn white_frame_maps_to_brightest_glyph() {
    let now = Instant::now();
    let media = FakeMedia { frame: Some(solid(255)), ..FakeMedia::default() };
    let mut renderer = renderer(media);
    renderer.play(now).unwrap();
    run_tick(&mut renderer, now);

    assert_eq!(renderer.output().last_text(), expected_block('@', renderer.layout()));
}

#[test]
fn pause_cancels_pending_tick_and_freezes_output() {
    let now = Instant::now();
    let media = FakeMedia { frame: Some(solid(0)), ..FakeMedia::default() };
    let mut renderer = renderer(media);
    renderer.play(now).unwrap();
    run_tick(&mut renderer, now);

    let stale = renderer.armed_tick().unwrap();
    renderer.pause(now);
    assert_eq!(renderer.scheduler().cancelled, vec![stale]);
    assert_eq!(renderer.scheduler().pending, None);

    let writes = renderer.output().texts.len();
    renderer.tick(stale, now + Duration::from_millis(16)).unwrap();
    renderer.tick(stale, now + Duration::from_millis(32)).unwrap();
    assert_eq!(renderer.output().texts.len(), writes);
    assert_eq!(renderer.armed_tick(), None);
}

#[test]
fn stale_tick_from_previous_session_is_ignored() {
    let now = Instant::now();
    let media = FakeMedia { frame: Some(solid(0)), ..FakeMedia::default() };
    let mut renderer = renderer(media);
    renderer.play(now).unwrap();
    let first = renderer.armed_tick().unwrap();
    renderer.pause(now);
    renderer.play(now).unwrap();

    let writes = renderer.output().texts.len();
    renderer.tick(first, now).unwrap();
    assert_eq!(renderer.output().texts.len(), writes);
    assert_ne!(renderer.armed_tick(), Some(first));
    assert!(renderer.armed_tick().is_some());
}

#[test]
fn resize_while_playing_keeps_state_and_changes_grid() {
    let now = Instant::now();
    let media = FakeMedia { frame: Some(solid(255)), ..FakeMedia::default() };
    let mut renderer = renderer(media);
    renderer.play(now).unwrap();

    renderer.resize(Viewport::new(600, 1000)).unwrap();
    assert_eq!(renderer.state(), PlaybackState::Playing);
    assert!(renderer.armed_tick().is_some());

    let layout = renderer.layout();
    assert_eq!((layout.columns, layout.rows), (100, 41));
    assert_eq!(renderer.output().layouts.last(), Some(&layout));

    run_tick(&mut renderer, now);
    assert_eq!(renderer.output().last_text(), expected_block('@', layout));
}

#[test]
fn resize_to_same_layout_is_quiet() {
    let mut renderer = renderer(FakeMedia::default());
    renderer.resize(Viewport::new(1280, 720)).unwrap();
    assert_eq!(renderer.output().layouts.len(), 1);
}

#[test]
fn refused_play_shows_prompt_and_keeps_intent() {
    let now = Instant::now();
    let media = FakeMedia { refuse: true, frame: Some(solid(255)), ..FakeMedia::default() };
    let mut renderer = renderer(media);

    renderer.play(now).unwrap();
    assert_eq!(renderer.state(), PlaybackState::Playing);
    assert_eq!(renderer.output().last_text(), PLAY_BLOCKED_MESSAGE);

    // The media never advanced: ticks idle without sampling but keep the loop alive.
    for step in 1..=3 {
        run_tick(&mut renderer, now + Duration::from_millis(16 * step));
        assert_eq!(renderer.output().last_text(), PLAY_BLOCKED_MESSAGE);
        assert!(renderer.armed_tick().is_some());
    }

    // No automatic retry.
    assert_eq!(renderer.media().play_calls, 1);
}

#[test]
fn refused_play_then_retry_after_toggle() {
    let now = Instant::now();
    let media = FakeMedia { refuse: true, frame: Some(solid(0)), ..FakeMedia::default() };
    let mut renderer = renderer(media);

    renderer.toggle(now).unwrap();
    renderer.toggle(now).unwrap();
    assert_eq!(renderer.state(), PlaybackState::Paused);
    assert_eq!(renderer.armed_tick(), None);

    renderer.toggle(now).unwrap();
    assert_eq!(renderer.media().play_calls, 2);
}

#[test]
fn natural_end_returns_to_paused() {
    let now = Instant::now();
    let media = FakeMedia { frame: Some(solid(0)), ..FakeMedia::default() };
    let mut renderer = renderer(media);
    renderer.play(now).unwrap();
    run_tick(&mut renderer, now);

    let writes = renderer.output().texts.len();
    let handle = renderer.armed_tick().unwrap();
    renderer.scheduler_mut().pending = None;
    // Decoder ran out.
    renderer.media_mut().ended = true;
    renderer.media_mut().playing = false;
    renderer.tick(handle, now).unwrap();

    assert_eq!(renderer.state(), PlaybackState::Paused);
    assert_eq!(renderer.armed_tick(), None);
    assert_eq!(renderer.output().texts.len(), writes);

    assert_eq!(renderer.toggle(now).unwrap(), PlaybackState::Playing);
    assert!(!renderer.media().ended);
}

#[test]
fn throttle_skips_early_ticks() {
    let now = Instant::now();
    let media = FakeMedia { frame: Some(solid(0)), ..FakeMedia::default() };
    let config = RendererConfig { frame_rate: Some(10.0), ..RendererConfig::default() };
    let mut renderer = renderer_with(media, config);
    renderer.play(now).unwrap();

    run_tick(&mut renderer, now);
    let writes = renderer.output().texts.len();

    run_tick(&mut renderer, now + Duration::from_millis(16));
    run_tick(&mut renderer, now + Duration::from_millis(50));
    assert_eq!(renderer.output().texts.len(), writes);
    assert!(renderer.armed_tick().is_some());

    run_tick(&mut renderer, now + Duration::from_millis(100));
    assert_eq!(renderer.output().texts.len(), writes + 1);
}

#[test]
fn empty_tick_does_not_hold_back_first_frame() {
    let now = Instant::now();
    let config = RendererConfig { frame_rate: Some(10.0), ..RendererConfig::default() };
    let mut renderer = renderer_with(FakeMedia::default(), config);
    renderer.play(now).unwrap();

    run_tick(&mut renderer, now);
    let writes = renderer.output().texts.len();

    renderer.media_mut().frame = Some(solid(255));
    run_tick(&mut renderer, now + Duration::from_millis(16));

    let layout = renderer.layout();
    assert_eq!(renderer.output().texts.len(), writes + 1);
    assert_eq!(renderer.output().last_text(), expected_block('@', layout));
}

#[test]
fn custom_ramp_and_bounds_apply() {
    let now = Instant::now();
    let media = FakeMedia { frame: Some(solid(255)), ..FakeMedia::default() };
    let config = RendererConfig {
        ramp: ascii_video::Gradient::parse(" #").unwrap(),
        layout: LayoutConfig { max_columns: 90, ..LayoutConfig::default() },
        ..RendererConfig::default()
    };
    let mut renderer = renderer_with(media, config);
    assert_eq!(renderer.layout().columns, 90);

    renderer.play(now).unwrap();
    run_tick(&mut renderer, now);
    assert_eq!(renderer.output().last_text(), expected_block('#', renderer.layout()));
}

#[test]
fn invalid_config_is_rejected() {
    let config = RendererConfig { frame_rate: Some(0.0), ..RendererConfig::default() };
    let result = Renderer::new(
        config,
        FakeMedia::default(),
        FakeOutput::default(),
        FakeScheduler::default(),
        Viewport::new(800, 600),
    );
    assert!(result.is_err());
}

#[test]
fn animation_source_plays_through_and_ends() {
    let start = Instant::now();
    let mut series = FrameSeries::new();
    series.push_frame(solid(0), Duration::from_millis(100));
    series.push_frame(solid(255), Duration::from_millis(100));

    let mut renderer = Renderer::new(
        RendererConfig::default(),
        AnimationSource::new(series),
        FakeOutput::default(),
        FakeScheduler::default(),
        Viewport::new(1280, 720),
    )
    .unwrap();
    let layout = renderer.layout();

    assert!(renderer.poll_ready().unwrap());
    renderer.toggle(start).unwrap();

    run_tick(&mut renderer, start + Duration::from_millis(16));
    assert_eq!(renderer.output().last_text(), expected_block(' ', layout));

    run_tick(&mut renderer, start + Duration::from_millis(150));
    assert_eq!(renderer.output().last_text(), expected_block('@', layout));

    // Past the end: the last frame stays up, then the loop winds down.
    run_tick(&mut renderer, start + Duration::from_millis(250));
    assert!(renderer.media().has_ended());
    run_tick(&mut renderer, start + Duration::from_millis(266));
    assert_eq!(renderer.state(), PlaybackState::Paused);
    assert_eq!(renderer.armed_tick(), None);
    assert_eq!(renderer.output().last_text(), expected_block('@', layout));
}
