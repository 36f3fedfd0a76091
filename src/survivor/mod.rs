//! Vibe Survivor: top-down horde shooter
//!
//! The world is unbounded in both axes and centered on the player's start.
//! Enemies arrive on a ring around the player; weapons fire on their own.

pub mod collision;
pub mod enemy;
pub mod player;
pub mod projectile;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod upgrades;
pub mod weapon;

pub use enemy::{BossPhase, Enemy, EnemyKind};
pub use player::{Passive, SurvivorInput, SurvivorPlayer};
pub use spawner::Spawner;
pub use state::SurvivorState;
pub use upgrades::UpgradeChoice;
pub use weapon::{Weapon, WeaponKind};

use crate::engine::game_loop::{FinalStats, Session, StepOutcome};
use crate::hud::HudSnapshot;

pub const CAMERA_SMOOTHING: f32 = 0.1;

impl Session for SurvivorState {
    type Input = SurvivorInput;

    fn reset(&mut self) {
        SurvivorState::reset(self);
    }

    fn step(&mut self, input: &SurvivorInput) -> StepOutcome {
        tick::tick(self, input)
    }

    fn sample_frame(&mut self, frame_ms: f64, now_ms: f64) {
        self.quality.sample(frame_ms, now_ms);
    }

    fn compact_pools(&mut self) -> usize {
        let mut removed = 0;
        if self.projectiles.is_oversized() {
            removed += self.projectiles.compact();
        }
        if self.particles.is_oversized() {
            removed += self.particles.compact();
        }
        if self.explosions.is_oversized() {
            removed += self.explosions.compact();
        }
        if self.orbs.is_oversized() {
            removed += self.orbs.compact();
        }
        removed
    }

    fn final_stats(&self) -> FinalStats {
        FinalStats {
            score: self.score(),
            elapsed_secs: self.elapsed_secs(),
            level: self.player.level,
            kills: self.kills,
            boss_kills: self.boss_kills,
            ..Default::default()
        }
    }

    fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            health: self.player.health,
            max_health: self.player.max_health,
            level: self.player.level,
            xp_progress: self.xp_progress(),
            elapsed_secs: self.elapsed_secs(),
            score: self.score(),
            weapons: self
                .player
                .weapons
                .iter()
                .map(|w| (w.kind.label().to_string(), w.level))
                .collect(),
            boss_kills: self.boss_kills,
            quality_tier: self.quality.profile().tier,
            choices: self.pending_choices.iter().map(UpgradeChoice::label).collect(),
            ..Default::default()
        }
    }

    fn has_pending_choice(&self) -> bool {
        !self.pending_choices.is_empty()
    }

    /// Brief grace period before the next wave reaches the player
    fn resume_after_victory(&mut self) {
        self.player.invulnerable = self
            .player
            .invulnerable
            .max(self.tuning.invulnerability_ticks * 2);
    }
}
