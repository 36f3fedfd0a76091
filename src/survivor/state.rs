//! Survivor session state

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::{Blast, Kill};
use super::enemy::{Enemy, Threat};
use super::player::SurvivorPlayer;
use super::projectile::{Explosion, Projectile, XpOrb};
use super::spawner::{Spawner, ticks_to_secs};
use super::upgrades::{self, CHOICES_PER_LEVEL, UpgradeChoice};
use super::CAMERA_SMOOTHING;
use crate::engine::camera::Camera;
use crate::engine::particle::Particle;
use crate::engine::pool::Pool;
use crate::engine::quality::QualityController;
use crate::settings::Effects;
use crate::tuning::{QualityTuning, SurvivorTuning};

pub const PROJECTILE_POOL: usize = 512;
pub const PARTICLE_POOL: usize = 512;
pub const EXPLOSION_POOL: usize = 32;
pub const ORB_POOL: usize = 256;

/// Scripted sequence between a boss kill and the victory checkpoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BossDefeat {
    pub pos: Vec2,
    pub ticks_left: u32,
}

pub struct SurvivorState {
    pub tuning: SurvivorTuning,
    pub seed: u64,
    pub rng: Pcg32,
    pub player: SurvivorPlayer,
    pub enemies: Vec<Enemy>,
    pub projectiles: Pool<Projectile>,
    pub particles: Pool<Particle>,
    pub explosions: Pool<Explosion>,
    pub orbs: Pool<XpOrb>,
    pub spawner: Spawner,
    pub camera: Camera,
    pub quality: QualityController,
    pub effects: Effects,
    pub ticks: u64,
    pub kills: u32,
    pub boss_kills: u32,
    /// Choices on offer for the current level-up
    pub pending_choices: Vec<UpgradeChoice>,
    /// Further level-ups earned while a choice is open
    pub queued_levels: u32,
    pub defeat: Option<BossDefeat>,
    /// Ticks until the game-over flip once health hit zero
    pub game_over_timer: Option<u32>,
    pub damage_flash: f32,
    // Per-tick scratch buffers
    pub(crate) threats: Vec<Threat>,
    pub(crate) blasts: Vec<Blast>,
    pub(crate) kill_buf: Vec<Kill>,
}

impl SurvivorState {
    pub fn new(tuning: &SurvivorTuning, quality: &QualityTuning, initial_tier: u8, seed: u64) -> Self {
        Self {
            tuning: tuning.clone(),
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player: SurvivorPlayer::new(tuning),
            enemies: Vec::with_capacity(tuning.max_enemies + 1),
            projectiles: Pool::new(PROJECTILE_POOL),
            particles: Pool::new(PARTICLE_POOL),
            explosions: Pool::new(EXPLOSION_POOL),
            orbs: Pool::new(ORB_POOL),
            spawner: Spawner::new(tuning),
            camera: Camera::new(Vec2::ZERO, CAMERA_SMOOTHING),
            quality: QualityController::new(quality.clone(), initial_tier),
            effects: Effects::default(),
            ticks: 0,
            kills: 0,
            boss_kills: 0,
            pending_choices: Vec::new(),
            queued_levels: 0,
            defeat: None,
            game_over_timer: None,
            damage_flash: 0.0,
            threats: Vec::new(),
            blasts: Vec::new(),
            kill_buf: Vec::new(),
        }
    }

    /// Seed used by the next `reset`
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    /// Discard the run and rebuild every collection
    pub fn reset(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.player = SurvivorPlayer::new(&self.tuning);
        self.enemies.clear();
        self.projectiles.clear();
        self.particles.clear();
        self.explosions.clear();
        self.orbs.clear();
        self.spawner.reset(&self.tuning);
        self.camera.snap(self.player.pos);
        self.quality.reset_sampling();
        self.ticks = 0;
        self.kills = 0;
        self.boss_kills = 0;
        self.pending_choices.clear();
        self.queued_levels = 0;
        self.defeat = None;
        self.game_over_timer = None;
        self.damage_flash = 0.0;
        self.threats.clear();
        self.blasts.clear();
        self.kill_buf.clear();
    }

    pub fn elapsed_secs(&self) -> f32 {
        ticks_to_secs(self.ticks)
    }

    pub fn score(&self) -> u64 {
        self.kills as u64 * 10 + self.boss_kills as u64 * 1_000 + self.elapsed_secs() as u64
    }

    pub fn xp_progress(&self) -> f32 {
        let need = self.player.xp_to_next(&self.tuning);
        if need <= 0.0 {
            0.0
        } else {
            (self.player.xp / need).clamp(0.0, 1.0)
        }
    }

    pub fn boss(&self) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.is_boss())
    }

    /// Grant experience; returns true when a new choice was opened
    pub(crate) fn gain_xp(&mut self, amount: f32) -> bool {
        self.player.xp += amount;
        let mut leveled = 0;
        loop {
            let need = self.player.xp_to_next(&self.tuning);
            if self.player.xp < need {
                break;
            }
            self.player.xp -= need;
            self.player.level += 1;
            leveled += 1;
        }
        if leveled == 0 {
            return false;
        }
        log::debug!("Reached level {}", self.player.level);
        self.queued_levels += leveled;
        self.open_next_choice()
    }

    fn open_next_choice(&mut self) -> bool {
        if !self.pending_choices.is_empty() || self.queued_levels == 0 {
            return false;
        }
        self.queued_levels -= 1;
        self.pending_choices = upgrades::roll_choices(&self.player, CHOICES_PER_LEVEL, &mut self.rng);
        if self.pending_choices.is_empty() {
            // Everything maxed out
            self.player.heal(self.player.max_health * 0.25);
            return self.open_next_choice();
        }
        true
    }

    /// Apply the `index`th pending choice. Returns false for an invalid index.
    pub fn choose_upgrade(&mut self, index: usize) -> bool {
        let Some(choice) = self.pending_choices.get(index).copied() else {
            return false;
        };
        self.pending_choices.clear();
        let merged = upgrades::apply_choice(&mut self.player, choice, self.tuning.merge_level);
        log::info!("Upgrade chosen: {}", choice.label());
        for kind in merged {
            log::info!("Weapon merge produced {}", kind.label());
        }
        self.open_next_choice();
        true
    }
}
