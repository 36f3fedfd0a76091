//! Fixed timestep runner step

use glam::Vec2;

use super::collision;
use super::obstacle::{GravityDir, PlayerMode, PortalKind};
use super::state::{RunnerInput, RunnerPlayer, RunnerState, TRAIL_BASE};
use super::{CAMERA_LEAD, WORLD_HEIGHT};
use crate::engine::game_loop::StepOutcome;
use crate::engine::geometry::lerp;
use crate::engine::particle::{self, ParticleKind};

pub const SHIP_GRAVITY: f32 = 0.45;
pub const SHIP_THRUST: f32 = 0.9;
pub const SHIP_MAX_VY: f32 = 7.0;
pub const CUBE_GRAVITY: f32 = 0.9;
pub const CUBE_JUMP: f32 = 11.0;
pub const CUBE_MAX_VY: f32 = 15.0;

const HIT_COLOR: [f32; 4] = [1.0, 0.3, 0.3, 1.0];
const PORTAL_COLOR: [f32; 4] = [0.4, 0.9, 1.0, 1.0];

/// Advance the run by one fixed step
pub fn tick(state: &mut RunnerState, input: &RunnerInput) -> StepOutcome {
    if !state.alive {
        return StepOutcome::GameOver;
    }
    state.ticks += 1;

    // Timers
    state.player.invulnerable = state.player.invulnerable.saturating_sub(1);
    state.flash *= 0.9;
    if state.flash < 0.01 {
        state.flash = 0.0;
    }

    // Speed ramps with distance
    let ramp = (state.distance / state.tuning.speed_ramp_distance.max(1.0)).clamp(0.0, 1.0);
    state.speed = lerp(state.tuning.base_speed, state.tuning.max_speed, ramp);

    move_player(&mut state.player, input.hold, state.speed);
    state.distance = state.player.pos.x - super::PLAYER_START_X;

    trigger_portals(state);

    // Content ahead, culling behind
    state.generator.update(
        state.distance,
        state.player.pos.x,
        &mut state.rng,
        &mut state.level,
    );
    state
        .level
        .cull_behind(state.player.pos.x, state.tuning.trailing_window);

    particle::advance_particles(&mut state.particles);
    let trail_len = if state.effects.trails {
        state.quality.profile().trail_length(TRAIL_BASE)
    } else {
        0
    };
    state.player.record_trail(trail_len);

    if let Some(outcome) = resolve_collisions(state) {
        return outcome;
    }

    state.camera.follow(Vec2::new(
        state.player.pos.x + CAMERA_LEAD,
        WORLD_HEIGHT * 0.5,
    ));
    StepOutcome::Continue
}

/// Apply gravity/thrust for the current mode and clamp to the world bounds
pub fn move_player(p: &mut RunnerPlayer, hold: bool, speed: f32) {
    let g = p.gravity.sign();
    match p.mode {
        PlayerMode::Ship => {
            p.vel_y += SHIP_GRAVITY * g;
            if hold {
                p.vel_y -= SHIP_THRUST * g;
            }
            p.vel_y = p.vel_y.clamp(-SHIP_MAX_VY, SHIP_MAX_VY);
        }
        PlayerMode::Cube => {
            if hold && p.grounded {
                p.vel_y = -CUBE_JUMP * g;
                p.grounded = false;
            }
            p.vel_y += CUBE_GRAVITY * g;
            p.vel_y = p.vel_y.clamp(-CUBE_MAX_VY, CUBE_MAX_VY);
        }
    }

    p.pos.x += speed;
    p.pos.y += p.vel_y;

    let top = p.radius;
    let bottom = WORLD_HEIGHT - p.radius;
    p.grounded = false;
    if p.pos.y >= bottom {
        p.pos.y = bottom;
        p.vel_y = p.vel_y.min(0.0);
        p.grounded = p.gravity == GravityDir::Down;
    }
    if p.pos.y <= top {
        p.pos.y = top;
        p.vel_y = p.vel_y.max(0.0);
        p.grounded = p.gravity == GravityDir::Up;
    }
}

fn trigger_portals(state: &mut RunnerState) {
    let player = &mut state.player;
    for portal in state.level.portals.iter_mut() {
        if portal.triggered || player.pos.x < portal.x {
            continue;
        }
        portal.triggered = true;
        match portal.kind {
            PortalKind::Gravity(dir) => {
                if player.gravity != dir {
                    player.gravity = dir;
                    player.vel_y *= 0.5;
                }
            }
            PortalKind::Mode(mode) => {
                player.mode = mode;
            }
        }
        if state.effects.particles {
            let count = state.quality.profile().particle_count(8);
            particle::burst(
                &mut state.particles,
                player.pos,
                count,
                2.0,
                PORTAL_COLOR,
                25.0,
                ParticleKind::Pickup,
                state.ticks as u32,
            );
        }
    }
}

/// Damage on contact; the run ends immediately at zero health
fn resolve_collisions(state: &mut RunnerState) -> Option<StepOutcome> {
    if state.player.is_invulnerable() {
        return None;
    }
    collision::first_hit(&state.level, state.player.pos, state.player.radius, state.ticks)?;

    let player = &mut state.player;
    player.health = player.health.saturating_sub(1);
    player.invulnerable = state.tuning.invulnerability_steps;
    state.hits_taken += 1;
    state.flash = 1.0;
    if state.effects.screen_shake {
        state.camera.add_shake(0.6);
    }
    if state.effects.particles {
        let count = state.quality.profile().particle_count(20);
        particle::burst(
            &mut state.particles,
            player.pos,
            count,
            4.0,
            HIT_COLOR,
            30.0,
            ParticleKind::Explosion,
            state.ticks as u32,
        );
    }

    if player.health == 0 {
        state.alive = false;
        log::info!(
            "Run over at distance {:.0} after {} hits",
            state.distance,
            state.hits_taken
        );
        return Some(StepOutcome::GameOver);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::geometry::Rect;
    use crate::runner::obstacle::{Obstacle, Portal};
    use crate::runner::{PLAYER_RADIUS, PLAYER_START_X};
    use crate::tuning::{QualityTuning, RunnerTuning};

    fn state() -> RunnerState {
        RunnerState::new(&RunnerTuning::default(), &QualityTuning::default(), 5, 7)
    }

    #[test]
    fn test_ship_thrust_and_bounds() {
        let mut p = RunnerPlayer::new(3);
        for _ in 0..200 {
            move_player(&mut p, false, 5.0);
        }
        assert_eq!(p.pos.y, WORLD_HEIGHT - PLAYER_RADIUS);
        for _ in 0..200 {
            move_player(&mut p, true, 5.0);
        }
        assert_eq!(p.pos.y, PLAYER_RADIUS);
        assert!((p.pos.x - (PLAYER_START_X + 2000.0)).abs() < 1e-2);
    }

    #[test]
    fn test_cube_jumps_only_when_grounded() {
        let mut p = RunnerPlayer::new(3);
        p.mode = PlayerMode::Cube;
        for _ in 0..100 {
            move_player(&mut p, false, 5.0);
        }
        assert!(p.grounded);
        move_player(&mut p, true, 5.0);
        assert!(!p.grounded);
        assert!(p.vel_y < 0.0);
        let vy = p.vel_y;
        move_player(&mut p, true, 5.0);
        assert!(p.vel_y > vy, "holding in the air does not jump again");
    }

    #[test]
    fn test_gravity_portal_flips_player() {
        let mut s = state();
        s.level.portals.push(Portal::new(
            PLAYER_START_X + 1.0,
            PortalKind::Gravity(GravityDir::Up),
        ));
        tick(&mut s, &RunnerInput::default());
        assert_eq!(s.player.gravity, GravityDir::Up);
        assert!(s.level.portals[0].triggered);
        for _ in 0..200 {
            tick(&mut s, &RunnerInput::default());
            s.player.invulnerable = 10;
        }
        assert_eq!(s.player.pos.y, PLAYER_RADIUS);
    }

    #[test]
    fn test_hits_respect_invulnerability_and_end_run() {
        let mut s = state();
        // A wall far longer than the invulnerability window
        s.level
            .obstacles
            .push(Obstacle::block(Rect::new(0.0, 0.0, 1_000_000.0, WORLD_HEIGHT)));
        assert_eq!(tick(&mut s, &RunnerInput::default()), StepOutcome::Continue);
        assert_eq!(s.player.health, 2);
        for _ in 0..s.tuning.invulnerability_steps - 1 {
            assert_eq!(tick(&mut s, &RunnerInput::default()), StepOutcome::Continue);
        }
        assert_eq!(s.player.health, 2);
        assert_eq!(tick(&mut s, &RunnerInput::default()), StepOutcome::Continue);
        assert_eq!(s.player.health, 1);

        let mut outcome = StepOutcome::Continue;
        for _ in 0..200 {
            outcome = tick(&mut s, &RunnerInput::default());
            if outcome != StepOutcome::Continue {
                break;
            }
        }
        assert_eq!(outcome, StepOutcome::GameOver);
        assert_eq!(s.player.health, 0);
        assert_eq!(s.hits_taken, 3);
    }

    #[test]
    fn test_reset_is_total() {
        let mut s = state();
        for _ in 0..600 {
            tick(&mut s, &RunnerInput { hold: true });
        }
        assert!(s.distance > 0.0);
        assert!(s.generator.sections_generated() > 0);
        s.reset();
        assert_eq!(s.distance, 0.0);
        assert_eq!(s.ticks, 0);
        assert!(s.level.obstacles.is_empty());
        assert_eq!(s.particles.active_count(), 0);
        assert_eq!(s.generator.sections_generated(), 0);
        assert_eq!(s.player.health, s.tuning.max_health);
    }
}
