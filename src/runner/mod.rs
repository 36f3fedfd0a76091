//! Vibe Runner: endless side-scroller
//!
//! The player travels right at a speed that ramps with distance while the
//! generator keeps building hazards ahead. World units: x grows right
//! without bound, y grows downward from the ceiling (0) to the floor
//! (`WORLD_HEIGHT`).

pub mod collision;
pub mod generator;
pub mod obstacle;
pub mod safety;
pub mod state;
pub mod tick;

pub use generator::{Level, Pattern, ProceduralGenerator, SectionKind};
pub use obstacle::{GravityDir, Obstacle, ObstacleKind, PlayerMode, Portal, PortalKind, Side};
pub use state::{RunnerInput, RunnerPlayer, RunnerState};

use crate::engine::game_loop::{FinalStats, Session, StepOutcome};
use crate::hud::HudSnapshot;

pub const WORLD_HEIGHT: f32 = 600.0;
pub const PLAYER_RADIUS: f32 = 12.0;
/// World x of the start line
pub const PLAYER_START_X: f32 = 150.0;
/// Camera looks this far ahead of the player
pub const CAMERA_LEAD: f32 = 250.0;
pub const CAMERA_SMOOTHING: f32 = 0.2;

impl Session for RunnerState {
    type Input = RunnerInput;

    fn reset(&mut self) {
        RunnerState::reset(self);
    }

    fn step(&mut self, input: &RunnerInput) -> StepOutcome {
        tick::tick(self, input)
    }

    fn sample_frame(&mut self, frame_ms: f64, now_ms: f64) {
        self.quality.sample(frame_ms, now_ms);
    }

    fn compact_pools(&mut self) -> usize {
        if self.particles.is_oversized() {
            self.particles.compact()
        } else {
            0
        }
    }

    fn final_stats(&self) -> FinalStats {
        FinalStats {
            score: self.score(),
            distance: self.distance,
            elapsed_secs: self.elapsed_secs(),
            level: self.difficulty() as u32 + 1,
            ..Default::default()
        }
    }

    fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            health: self.player.health as f32,
            max_health: self.player.max_health as f32,
            level: self.difficulty() as u32 + 1,
            xp_progress: self.difficulty().fract(),
            elapsed_secs: self.elapsed_secs(),
            distance: self.distance,
            score: self.score(),
            quality_tier: self.quality.profile().tier,
            ..Default::default()
        }
    }
}
