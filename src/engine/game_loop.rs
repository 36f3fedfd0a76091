//! Game loop driver
//!
//! Owns the `Menu → Running ⇄ Paused → GameOver|Victory → Menu` state
//! machine and converts host frame callbacks into simulation steps. The
//! host calls `tick(now_ms, viewport)` once per animation frame and stops
//! rescheduling as soon as it returns `FrameOutcome::Stopped`.

use serde::Serialize;

use super::frame_monitor::FrameRateMonitor;
use super::timestep::FixedTimestep;
use crate::audio::AudioSink;
use crate::highscores::HighScore;
use crate::hud::HudSnapshot;
use crate::platform::KeyValueStore;
use crate::tuning::QualityTuning;

/// Longest wall-clock delta fed to the simulation per frame (seconds).
/// Bounds catch-up work after a stall or a backgrounded tab.
pub const MAX_FRAME_DELTA: f64 = 0.25;

/// Simulation tick rate both games are tuned for
pub const TICK_RATE: f64 = 60.0;
pub const TICK_MS: f64 = 1000.0 / TICK_RATE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Menu,
    Running,
    Paused,
    /// Waiting for an upgrade choice; simulation frozen
    LevelUp,
    GameOver,
    /// Boss defeated checkpoint; can continue into Running
    Victory,
}

/// What a single simulation step asks the loop to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    LevelUp,
    GameOver,
    Victory,
}

/// How frame time maps onto simulation steps
#[derive(Debug, Clone)]
pub enum StepPolicy {
    /// Accumulate wall-clock time into fixed steps
    Fixed(FixedTimestep),
    /// Exactly one step per frame; per-tick constants carry the scale
    PerFrame,
}

impl StepPolicy {
    pub fn fixed_60hz() -> Self {
        StepPolicy::Fixed(FixedTimestep::new(1.0 / TICK_RATE))
    }
}

/// Result of one host frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Loop halted; do not reschedule
    Stopped,
    /// Render target not sized yet; skipped, retry next frame
    NotReady,
    Frame { steps: u32, render: bool },
}

/// Drawing surface dimensions in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_ready(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Input state written by event handlers and consumed on the next step
pub trait FrameInput: Default + Clone {
    /// Clear one-shot presses once a step has consumed them
    fn clear_edges(&mut self) {}
}

/// Stats surfaced when a run ends
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinalStats {
    pub score: u64,
    pub distance: f32,
    pub elapsed_secs: f32,
    pub level: u32,
    pub kills: u32,
    pub boss_kills: u32,
    pub high_score: u64,
    pub new_high_score: bool,
}

/// A game simulation driven by `GameLoop`
pub trait Session {
    type Input: FrameInput;

    /// Discard every entity collection and reinitialize
    fn reset(&mut self);
    /// Advance the simulation by one tick
    fn step(&mut self, input: &Self::Input) -> StepOutcome;
    /// Feed the frame duration to adaptive quality
    fn sample_frame(&mut self, frame_ms: f64, now_ms: f64);
    /// Trim oversized pools; returns slots removed
    fn compact_pools(&mut self) -> usize;
    fn final_stats(&self) -> FinalStats;
    fn hud(&self) -> HudSnapshot;

    /// An upgrade choice is still outstanding
    fn has_pending_choice(&self) -> bool {
        false
    }

    /// Leave the victory checkpoint with escalated difficulty
    fn resume_after_victory(&mut self) {}
}

struct ScoreBoard {
    high_score: HighScore,
    store: Box<dyn KeyValueStore>,
}

pub struct GameLoop<S: Session> {
    session: S,
    phase: Phase,
    resume_phase: Phase,
    policy: StepPolicy,
    input: S::Input,
    monitor: FrameRateMonitor,
    frame_skip_allowed: bool,
    running: bool,
    last_time_ms: Option<f64>,
    session_start_ms: Option<f64>,
    audio: Option<Box<dyn AudioSink>>,
    scores: Option<ScoreBoard>,
    final_stats: Option<FinalStats>,
}

impl<S: Session> GameLoop<S> {
    pub fn new(session: S, policy: StepPolicy, quality: &QualityTuning) -> Self {
        let frame_skip_allowed = matches!(policy, StepPolicy::PerFrame);
        Self {
            session,
            phase: Phase::Menu,
            resume_phase: Phase::Running,
            policy,
            input: S::Input::default(),
            monitor: FrameRateMonitor::new(quality),
            frame_skip_allowed,
            running: false,
            last_time_ms: None,
            session_start_ms: None,
            audio: None,
            scores: None,
            final_stats: None,
        }
    }

    /// Attach the externally owned music handle
    pub fn with_audio(mut self, audio: Box<dyn AudioSink>) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Attach high score tracking backed by `store`
    pub fn with_high_score(mut self, key: &str, store: Box<dyn KeyValueStore>) -> Self {
        let high_score = HighScore::load(key, store.as_ref());
        self.scores = Some(ScoreBoard { high_score, store });
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    /// Input state for event handlers to write into
    pub fn input_mut(&mut self) -> &mut S::Input {
        &mut self.input
    }

    pub fn fps(&self) -> f32 {
        self.monitor.fps()
    }

    pub fn high_score(&self) -> u64 {
        self.scores.as_ref().map(|s| s.high_score.best()).unwrap_or(0)
    }

    pub fn final_stats(&self) -> Option<&FinalStats> {
        self.final_stats.as_ref()
    }

    /// HUD values for the DOM layer, with loop-level fields filled in
    pub fn hud(&self) -> HudSnapshot {
        let mut hud = self.session.hud();
        hud.fps = self.monitor.fps();
        hud.high_score = self.high_score().max(hud.score);
        hud.phase = self.phase;
        hud
    }

    /// Begin a fresh run from any phase (also used for restart)
    pub fn start(&mut self) {
        self.session.reset();
        if let StepPolicy::Fixed(ts) = &mut self.policy {
            ts.reset();
        }
        self.input = S::Input::default();
        self.monitor.reset();
        self.last_time_ms = None;
        self.session_start_ms = None;
        self.final_stats = None;
        self.phase = Phase::Running;
        self.running = true;
        self.play_audio();
        log::info!("Session started");
    }

    pub fn pause(&mut self) {
        if matches!(self.phase, Phase::Running | Phase::LevelUp) {
            self.resume_phase = self.phase;
            self.phase = Phase::Paused;
            if let Some(audio) = &mut self.audio {
                audio.pause();
            }
        }
    }

    pub fn resume(&mut self) {
        if self.phase == Phase::Paused {
            self.phase = self.resume_phase;
            self.play_audio();
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.phase {
            Phase::Paused => self.resume(),
            _ => self.pause(),
        }
    }

    /// Leave the victory checkpoint and keep playing
    pub fn continue_after_victory(&mut self) {
        if self.phase == Phase::Victory {
            self.session.resume_after_victory();
            self.phase = Phase::Running;
            log::info!("Continuing after boss defeat");
        }
    }

    /// Halt scheduling and surface final stats. A live run ends in GameOver.
    pub fn stop(&mut self) -> FinalStats {
        if let Some(stats) = &self.final_stats {
            if !self.running {
                return stats.clone();
            }
        }
        self.running = false;
        if matches!(
            self.phase,
            Phase::Running | Phase::Paused | Phase::LevelUp | Phase::Victory
        ) {
            self.phase = Phase::GameOver;
        }
        if let Some(audio) = &mut self.audio {
            audio.pause();
        }
        let stats = self.record_final_stats();
        log::info!(
            "Session stopped: score {} (best {})",
            stats.score,
            stats.high_score
        );
        stats
    }

    /// Total, idempotent teardown back to the menu
    pub fn exit(&mut self) {
        self.running = false;
        if let Some(audio) = &mut self.audio {
            audio.pause();
        }
        self.session.reset();
        if let StepPolicy::Fixed(ts) = &mut self.policy {
            ts.reset();
        }
        self.input = S::Input::default();
        self.monitor.reset();
        self.last_time_ms = None;
        self.session_start_ms = None;
        self.phase = Phase::Menu;
    }

    /// Idle-time housekeeping hook
    pub fn compact_pools(&mut self) -> usize {
        let removed = self.session.compact_pools();
        if removed > 0 {
            log::debug!("Compacted pools, {removed} slots trimmed");
        }
        removed
    }

    /// Process one host animation frame at `now_ms`
    pub fn tick(&mut self, now_ms: f64, viewport: Viewport) -> FrameOutcome {
        if !self.running {
            return FrameOutcome::Stopped;
        }
        if !viewport.is_ready() {
            self.last_time_ms = Some(now_ms);
            return FrameOutcome::NotReady;
        }

        let frame_ms = match self.last_time_ms {
            Some(last) => (now_ms - last).max(0.0),
            None => TICK_MS,
        };
        self.last_time_ms = Some(now_ms);
        let start = *self.session_start_ms.get_or_insert(now_ms);
        let session_ms = now_ms - start;
        self.monitor.record(frame_ms, session_ms);

        let mut steps = 0;
        match self.phase {
            Phase::Running => {
                self.session.sample_frame(frame_ms, now_ms);
                let due = match &mut self.policy {
                    StepPolicy::Fixed(ts) => {
                        ts.accumulate((frame_ms / 1000.0).min(MAX_FRAME_DELTA))
                    }
                    StepPolicy::PerFrame => 1,
                };
                for _ in 0..due {
                    let outcome = self.session.step(&self.input);
                    self.input.clear_edges();
                    steps += 1;
                    if self.apply_outcome(outcome) {
                        break;
                    }
                }
            }
            Phase::LevelUp => {
                if !self.session.has_pending_choice() {
                    self.phase = Phase::Running;
                }
            }
            Phase::Menu | Phase::Paused | Phase::GameOver | Phase::Victory => {}
        }

        let render = !self.frame_skip_allowed || self.monitor.should_render();
        FrameOutcome::Frame { steps, render }
    }

    /// Returns true when the phase left Running
    fn apply_outcome(&mut self, outcome: StepOutcome) -> bool {
        match outcome {
            StepOutcome::Continue => false,
            StepOutcome::LevelUp => {
                self.phase = Phase::LevelUp;
                true
            }
            StepOutcome::Victory => {
                self.phase = Phase::Victory;
                log::info!("Victory checkpoint reached");
                true
            }
            StepOutcome::GameOver => {
                self.phase = Phase::GameOver;
                self.stop();
                true
            }
        }
    }

    fn record_final_stats(&mut self) -> FinalStats {
        let mut stats = self.session.final_stats();
        if let Some(board) = &mut self.scores {
            match board.high_score.submit(stats.score, board.store.as_mut()) {
                Ok(new_best) => stats.new_high_score = new_best,
                Err(e) => log::warn!("Failed to save high score: {e}"),
            }
            stats.high_score = board.high_score.best();
        } else {
            stats.high_score = stats.score;
        }
        self.final_stats = Some(stats.clone());
        stats
    }

    fn play_audio(&mut self) {
        if let Some(audio) = &mut self.audio {
            if let Err(e) = audio.play() {
                log::warn!("Audio playback failed, continuing without music: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;
    use crate::platform::MemoryStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default, Clone)]
    struct CountInput {
        press: bool,
    }

    impl FrameInput for CountInput {
        fn clear_edges(&mut self) {
            self.press = false;
        }
    }

    /// Counts steps; ends the run after `die_at` steps
    #[derive(Default)]
    struct Counter {
        steps: u64,
        presses: u32,
        die_at: Option<u64>,
        victory_at: Option<u64>,
        resumed: u32,
    }

    impl Session for Counter {
        type Input = CountInput;

        fn reset(&mut self) {
            self.steps = 0;
            self.presses = 0;
        }

        fn step(&mut self, input: &CountInput) -> StepOutcome {
            self.steps += 1;
            if input.press {
                self.presses += 1;
            }
            if Some(self.steps) == self.die_at {
                return StepOutcome::GameOver;
            }
            if Some(self.steps) == self.victory_at {
                return StepOutcome::Victory;
            }
            StepOutcome::Continue
        }

        fn sample_frame(&mut self, _frame_ms: f64, _now_ms: f64) {}

        fn compact_pools(&mut self) -> usize {
            0
        }

        fn final_stats(&self) -> FinalStats {
            FinalStats {
                score: self.steps * 10,
                ..Default::default()
            }
        }

        fn hud(&self) -> HudSnapshot {
            HudSnapshot {
                score: self.steps * 10,
                ..Default::default()
            }
        }

        fn resume_after_victory(&mut self) {
            self.resumed += 1;
        }
    }

    #[derive(Default)]
    struct AudioLog {
        plays: u32,
        pauses: u32,
        fail: bool,
    }

    struct SharedAudio(Rc<RefCell<AudioLog>>);

    impl AudioSink for SharedAudio {
        fn play(&mut self) -> crate::error::Result<()> {
            let mut log = self.0.borrow_mut();
            log.plays += 1;
            if log.fail {
                Err(GameError::Audio("autoplay blocked".into()))
            } else {
                Ok(())
            }
        }

        fn pause(&mut self) {
            self.0.borrow_mut().pauses += 1;
        }
    }

    const VIEW: Viewport = Viewport::new(800, 600);

    fn fixed_loop(session: Counter) -> GameLoop<Counter> {
        GameLoop::new(session, StepPolicy::fixed_60hz(), &QualityTuning::default())
    }

    #[test]
    fn test_menu_does_not_tick() {
        let mut game = fixed_loop(Counter::default());
        assert_eq!(game.phase(), Phase::Menu);
        assert_eq!(game.tick(0.0, VIEW), FrameOutcome::Stopped);
    }

    #[test]
    fn test_fixed_steps_follow_wall_clock() {
        let mut game = fixed_loop(Counter::default());
        game.start();
        game.tick(0.0, VIEW); // first frame counts as one tick
        for i in 1..=60 {
            game.tick(i as f64 * TICK_MS, VIEW);
        }
        assert_eq!(game.session().steps, 61);
    }

    #[test]
    fn test_not_ready_surface_skips_tick() {
        let mut game = fixed_loop(Counter::default());
        game.start();
        assert_eq!(game.tick(0.0, Viewport::new(0, 600)), FrameOutcome::NotReady);
        assert_eq!(game.session().steps, 0);
        assert!(matches!(game.tick(16.7, VIEW), FrameOutcome::Frame { .. }));
    }

    #[test]
    fn test_pause_freezes_simulation_but_keeps_rendering() {
        let mut game = fixed_loop(Counter::default());
        game.start();
        game.tick(0.0, VIEW);
        game.pause();
        let before = game.session().steps;
        for i in 1..30 {
            let out = game.tick(i as f64 * TICK_MS, VIEW);
            assert_eq!(out, FrameOutcome::Frame { steps: 0, render: true });
        }
        assert_eq!(game.session().steps, before);
        game.resume();
        game.tick(31.0 * TICK_MS, VIEW);
        assert_eq!(game.session().steps, before + 1, "no catch-up after pause");
    }

    #[test]
    fn test_edges_cleared_after_step() {
        let mut game = GameLoop::new(
            Counter::default(),
            StepPolicy::PerFrame,
            &QualityTuning::default(),
        );
        game.start();
        game.input_mut().press = true;
        game.tick(0.0, VIEW);
        game.tick(16.0, VIEW);
        assert_eq!(game.session().presses, 1);
    }

    #[test]
    fn test_game_over_stops_and_records_high_score() {
        let counter = Counter {
            die_at: Some(5),
            ..Default::default()
        };
        let mut game = GameLoop::new(counter, StepPolicy::PerFrame, &QualityTuning::default())
            .with_high_score("test_high", Box::new(MemoryStore::default()));
        game.start();
        for i in 0..10 {
            game.tick(i as f64 * TICK_MS, VIEW);
        }
        assert_eq!(game.phase(), Phase::GameOver);
        assert!(!game.is_running());
        assert_eq!(game.session().steps, 5);
        let stats = game.final_stats().unwrap();
        assert_eq!(stats.score, 50);
        assert!(stats.new_high_score);
        assert_eq!(game.high_score(), 50);

        // A worse second run does not overwrite the best
        game.session_mut().die_at = Some(2);
        game.start();
        for i in 0..5 {
            game.tick(i as f64 * TICK_MS, VIEW);
        }
        let stats = game.final_stats().unwrap();
        assert!(!stats.new_high_score);
        assert_eq!(stats.high_score, 50);
    }

    #[test]
    fn test_victory_continue() {
        let counter = Counter {
            victory_at: Some(3),
            ..Default::default()
        };
        let mut game = GameLoop::new(counter, StepPolicy::PerFrame, &QualityTuning::default());
        game.start();
        for i in 0..6 {
            game.tick(i as f64 * TICK_MS, VIEW);
        }
        assert_eq!(game.phase(), Phase::Victory);
        assert_eq!(game.session().steps, 3);
        game.continue_after_victory();
        assert_eq!(game.phase(), Phase::Running);
        assert_eq!(game.session().resumed, 1);
        game.tick(10.0 * TICK_MS, VIEW);
        assert_eq!(game.session().steps, 4);
    }

    #[test]
    fn test_audio_contract_and_failure_tolerance() {
        let log = Rc::new(RefCell::new(AudioLog {
            fail: true,
            ..Default::default()
        }));
        let mut game = fixed_loop(Counter::default()).with_audio(Box::new(SharedAudio(log.clone())));
        game.start();
        assert_eq!(game.phase(), Phase::Running, "audio failure must not block start");
        game.pause();
        game.resume();
        game.stop();
        let log = log.borrow();
        assert_eq!(log.plays, 2);
        assert_eq!(log.pauses, 2);
    }

    #[test]
    fn test_stop_from_running_ends_the_run() {
        let mut game = fixed_loop(Counter::default());
        game.start();
        game.tick(0.0, VIEW);
        game.stop();
        assert!(!game.is_running());
        assert_eq!(game.phase(), Phase::GameOver);
        assert!(game.final_stats().is_some());
        assert_eq!(game.tick(100.0, VIEW), FrameOutcome::Stopped);

        game.stop();
        assert_eq!(game.phase(), Phase::GameOver);
    }

    #[test]
    fn test_exit_is_idempotent() {
        let mut game = fixed_loop(Counter::default());
        game.start();
        game.tick(0.0, VIEW);
        game.exit();
        game.exit();
        assert_eq!(game.phase(), Phase::Menu);
        assert_eq!(game.session().steps, 0);
        assert_eq!(game.tick(100.0, VIEW), FrameOutcome::Stopped);
    }
}
