//! Runner session state
//!
//! Everything a run owns lives here and is rebuilt wholesale by `reset`.

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::generator::{Level, ProceduralGenerator};
use super::obstacle::{GravityDir, PlayerMode};
use super::{CAMERA_LEAD, CAMERA_SMOOTHING, PLAYER_RADIUS, PLAYER_START_X, WORLD_HEIGHT};
use crate::engine::camera::Camera;
use crate::engine::game_loop::FrameInput;
use crate::engine::particle::Particle;
use crate::engine::pool::Pool;
use crate::engine::quality::QualityController;
use crate::settings::Effects;
use crate::tuning::{QualityTuning, RunnerTuning};

/// Nominal particle pool size
pub const PARTICLE_POOL: usize = 256;

/// Trail length at full quality
pub const TRAIL_BASE: usize = 20;

/// Input consumed by the next step
#[derive(Debug, Clone, Default)]
pub struct RunnerInput {
    /// Fly-up / jump held (key, pointer or touch)
    pub hold: bool,
}

impl FrameInput for RunnerInput {}

#[derive(Debug, Clone)]
pub struct RunnerPlayer {
    pub pos: Vec2,
    pub vel_y: f32,
    pub radius: f32,
    pub health: u32,
    pub max_health: u32,
    /// Steps of post-hit invulnerability left
    pub invulnerable: u32,
    pub mode: PlayerMode,
    pub gravity: GravityDir,
    pub grounded: bool,
    /// Recent positions, newest first
    pub trail: VecDeque<Vec2>,
}

impl RunnerPlayer {
    pub fn new(max_health: u32) -> Self {
        Self {
            pos: Vec2::new(PLAYER_START_X, WORLD_HEIGHT * 0.5),
            vel_y: 0.0,
            radius: PLAYER_RADIUS,
            health: max_health,
            max_health,
            invulnerable: 0,
            mode: PlayerMode::Ship,
            gravity: GravityDir::Down,
            grounded: false,
            trail: VecDeque::with_capacity(TRAIL_BASE),
        }
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable > 0
    }

    pub fn record_trail(&mut self, max_len: usize) {
        self.trail.push_front(self.pos);
        self.trail.truncate(max_len);
    }
}

pub struct RunnerState {
    pub tuning: RunnerTuning,
    pub seed: u64,
    pub rng: Pcg32,
    pub player: RunnerPlayer,
    pub level: Level,
    pub generator: ProceduralGenerator,
    pub particles: Pool<Particle>,
    pub camera: Camera,
    pub quality: QualityController,
    pub effects: Effects,
    /// Distance traveled since the start line
    pub distance: f32,
    /// Current horizontal speed (units per step)
    pub speed: f32,
    pub ticks: u64,
    /// Damage flash intensity (0..1)
    pub flash: f32,
    pub hits_taken: u32,
    pub alive: bool,
}

impl RunnerState {
    pub fn new(tuning: &RunnerTuning, quality: &QualityTuning, initial_tier: u8, seed: u64) -> Self {
        let player = RunnerPlayer::new(tuning.max_health);
        let start = player.pos;
        Self {
            generator: ProceduralGenerator::new(tuning, PLAYER_RADIUS),
            tuning: tuning.clone(),
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player,
            level: Level::default(),
            particles: Pool::new(PARTICLE_POOL),
            camera: Camera::new(Vec2::new(start.x + CAMERA_LEAD, WORLD_HEIGHT * 0.5), CAMERA_SMOOTHING),
            quality: QualityController::new(quality.clone(), initial_tier),
            effects: Effects::default(),
            distance: 0.0,
            speed: tuning.base_speed,
            ticks: 0,
            flash: 0.0,
            hits_taken: 0,
            alive: true,
        }
    }

    /// Seed used by the next `reset`
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    /// Discard the run and rebuild every collection
    pub fn reset(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.player = RunnerPlayer::new(self.tuning.max_health);
        self.level.clear();
        self.generator.reset();
        self.particles.clear();
        self.camera
            .snap(Vec2::new(self.player.pos.x + CAMERA_LEAD, WORLD_HEIGHT * 0.5));
        self.quality.reset_sampling();
        self.distance = 0.0;
        self.speed = self.tuning.base_speed;
        self.ticks = 0;
        self.flash = 0.0;
        self.hits_taken = 0;
        self.alive = true;
    }

    pub fn score(&self) -> u64 {
        (self.distance.max(0.0) / 10.0) as u64
    }

    pub fn difficulty(&self) -> f32 {
        self.generator.difficulty(self.distance)
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.ticks as f32 / crate::engine::game_loop::TICK_RATE as f32
    }
}
