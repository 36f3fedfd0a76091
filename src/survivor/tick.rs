//! One survivor simulation tick
//!
//! Order: timers, movement, dash, spawning, enemy AI, projectiles,
//! particles, pickups, collisions, level-up, camera.

use glam::Vec2;

use super::collision::{self, Crit};
use super::enemy::{EnemyKind, Volley, update_enemy};
use super::player::{SurvivorInput, TRAIL_BASE};
use super::projectile::{
    self, Owner, Projectile, ProjectileKind, XpOrb, advance_explosions, advance_orbs,
    advance_projectiles,
};
use super::state::{BossDefeat, SurvivorState};
use super::weapon::{fire, nearest_target};
use crate::engine::game_loop::StepOutcome;
use crate::engine::particle::{self, ParticleKind};
use crate::engine::pool::Pool;

const BOSS_MISSILE_SPEED: f32 = 3.5;
const BOSS_MISSILE_LIFE: u32 = 240;
/// Total fan angle of a boss volley
const VOLLEY_SPREAD: f32 = 1.2;
/// Ticks between explosion bursts during the defeat sequence
const DEFEAT_BURST_INTERVAL: u32 = 20;

const KILL_COLOR: [f32; 4] = [1.0, 0.35, 0.5, 1.0];
const HIT_COLOR: [f32; 4] = [1.0, 0.2, 0.2, 1.0];
const BOSS_COLOR: [f32; 4] = [1.0, 0.75, 0.2, 1.0];

/// Advance the session by one tick
pub fn tick(state: &mut SurvivorState, input: &SurvivorInput) -> StepOutcome {
    state.ticks += 1;
    state.damage_flash *= 0.92;
    if state.damage_flash < 0.01 {
        state.damage_flash = 0.0;
    }

    if let Some(timer) = state.game_over_timer {
        advance_cosmetics(state);
        if timer <= 1 {
            state.game_over_timer = Some(0);
            return StepOutcome::GameOver;
        }
        state.game_over_timer = Some(timer - 1);
        return StepOutcome::Continue;
    }

    if state.defeat.is_some() {
        return advance_defeat(state, input);
    }

    tick_timers(state);
    state.player.apply_movement(input, state.tuning.player_speed);
    state.player.try_dash(input, &state.tuning);
    fire_weapons(state);

    let elapsed = state.elapsed_secs();
    let report = state.spawner.update(
        &state.tuning,
        elapsed,
        state.player.pos,
        &mut state.enemies,
        &mut state.rng,
    );
    if report.boss_spawned && state.effects.screen_shake {
        state.camera.add_shake(0.5);
    }

    move_enemies(state);
    advance_projectiles(&mut state.projectiles, &state.enemies, state.player.pos);
    particle::advance_particles(&mut state.particles);
    advance_explosions(&mut state.explosions);
    let magnet = state.tuning.magnet_radius * state.player.passives.magnet_mult();
    let collected = advance_orbs(
        &mut state.orbs,
        state.player.pos,
        state.player.radius,
        magnet,
        state.tuning.magnet_speed,
    );

    resolve_collisions(state);
    handle_kills(state);

    let leveled = collected > 0.0 && state.gain_xp(collected);
    follow_camera(state);
    if leveled {
        StepOutcome::LevelUp
    } else {
        StepOutcome::Continue
    }
}

fn tick_timers(state: &mut SurvivorState) {
    let player = &mut state.player;
    player.invulnerable = player.invulnerable.saturating_sub(1);
    player.dash_cooldown = player.dash_cooldown.saturating_sub(1);
    let regen = player.passives.regen_per_tick();
    if regen > 0.0 {
        player.heal(regen);
    }
    for e in state.enemies.iter_mut() {
        e.tick_burn();
    }
}

/// Every weapon counts down on its own and fires at the nearest enemy in range
fn fire_weapons(state: &mut SurvivorState) {
    let mult = state.player.passives.fire_rate_mult();
    let origin = state.player.pos;
    for weapon in state.player.weapons.iter_mut() {
        if !weapon.tick_cooldown(mult) {
            continue;
        }
        if let Some(i) = nearest_target(&state.enemies, origin, weapon.stats.range) {
            fire(weapon, origin, &state.enemies[i], 1.0, &mut state.projectiles);
        }
    }
}

fn move_enemies(state: &mut SurvivorState) {
    state.threats.clear();
    state.threats.extend(
        state
            .projectiles
            .iter()
            .filter(|(_, p)| p.owner == Owner::Player && p.kind != ProjectileKind::Chain)
            .map(|(_, p)| (p.pos, p.vel)),
    );
    let player_pos = state.player.pos;
    for e in state.enemies.iter_mut().filter(|e| e.is_alive()) {
        if let Some(volley) = update_enemy(e, player_pos, &state.threats, &mut state.rng) {
            launch_volley(&mut state.projectiles, volley, player_pos);
        }
    }
}

/// Fan of homing missiles aimed at the player
fn launch_volley(projectiles: &mut Pool<Projectile>, volley: Volley, target: Vec2) {
    let aim = (target - volley.origin).normalize_or(Vec2::X);
    let base = aim.y.atan2(aim.x);
    let n = volley.count.max(1);
    for i in 0..n {
        let offset = if n == 1 {
            0.0
        } else {
            -VOLLEY_SPREAD * 0.5 + VOLLEY_SPREAD * i as f32 / (n - 1) as f32
        };
        let angle = base + offset;
        projectiles.spawn(Projectile {
            pos: volley.origin,
            vel: Vec2::new(angle.cos(), angle.sin()) * BOSS_MISSILE_SPEED,
            damage: volley.damage,
            life: BOSS_MISSILE_LIFE,
            owner: Owner::Enemy,
            kind: ProjectileKind::BossMissile,
            radius: ProjectileKind::BossMissile.radius(),
            homing: true,
            ..Default::default()
        });
    }
}

fn resolve_collisions(state: &mut SurvivorState) {
    let crit = Crit {
        chance: state
            .player
            .passives
            .crit_chance(state.tuning.crit_chance_per_stack),
        multiplier: state.tuning.crit_multiplier,
    };
    collision::resolve_player_projectiles(
        &mut state.projectiles,
        &mut state.enemies,
        crit,
        &mut state.rng,
        &mut state.blasts,
    );
    collision::apply_blasts(&mut state.blasts, &mut state.enemies, &mut state.explosions);

    let hits = collision::resolve_player_hits(
        &mut state.player,
        &state.enemies,
        &mut state.projectiles,
        state.tuning.invulnerability_ticks,
    );
    if hits.damaged {
        state.damage_flash = 1.0;
        if state.effects.screen_shake {
            state.camera.add_shake(0.4);
        }
        let at = state.player.pos;
        emit(state, at, 10, 3.0, HIT_COLOR, ParticleKind::Blood);
    }
    if hits.killed {
        state.game_over_timer = Some(state.tuning.game_over_delay_ticks);
        log::info!(
            "Player died at {:.0}s with {} kills",
            state.elapsed_secs(),
            state.kills
        );
    }
}

/// Remove the dead, drop XP, and start the defeat sequence on a boss kill
fn handle_kills(state: &mut SurvivorState) {
    state.kill_buf.clear();
    collision::drain_dead(&mut state.enemies, &mut state.kill_buf);
    let kills = std::mem::take(&mut state.kill_buf);
    let mut boss_pos = None;
    for kill in &kills {
        if kill.kind == EnemyKind::Boss {
            boss_pos = Some(kill.pos);
        } else {
            state.kills += 1;
        }
        state.orbs.spawn(XpOrb {
            pos: kill.pos,
            value: kill.xp,
            life: state.tuning.orb_lifetime_ticks,
        });
        emit(state, kill.pos, 8, 2.5, KILL_COLOR, ParticleKind::Explosion);
    }
    state.kill_buf = kills;

    let Some(pos) = boss_pos else {
        return;
    };
    state.boss_kills += 1;
    let elapsed = state.elapsed_secs();
    state.spawner.on_boss_defeated(&state.tuning, elapsed);
    // Clear the hazard field
    state.enemies.clear();
    state.projectiles.retain(|p| p.owner == Owner::Player);
    state.defeat = Some(BossDefeat {
        pos,
        ticks_left: state.tuning.boss_defeat_ticks,
    });
    if state.effects.screen_shake {
        state.camera.add_shake(1.0);
    }
}

/// Scripted boss death: bursts and shake, then the victory checkpoint
fn advance_defeat(state: &mut SurvivorState, input: &SurvivorInput) -> StepOutcome {
    let Some(mut defeat) = state.defeat else {
        return StepOutcome::Continue;
    };
    state.player.apply_movement(input, state.tuning.player_speed);
    advance_cosmetics(state);
    let collected = advance_orbs(
        &mut state.orbs,
        state.player.pos,
        state.player.radius,
        state.tuning.magnet_radius * state.player.passives.magnet_mult(),
        state.tuning.magnet_speed,
    );
    state.player.xp += collected;

    if defeat.ticks_left % DEFEAT_BURST_INTERVAL == 0 {
        let jitter = Vec2::new(
            ((defeat.ticks_left * 37) % 80) as f32 - 40.0,
            ((defeat.ticks_left * 53) % 80) as f32 - 40.0,
        );
        emit(state, defeat.pos + jitter, 24, 5.0, BOSS_COLOR, ParticleKind::Explosion);
        state.explosions.spawn(projectile::Explosion {
            pos: defeat.pos + jitter,
            radius: 90.0,
            life: 30.0,
            max_life: 30.0,
        });
        if state.effects.screen_shake {
            state.camera.add_shake(0.5);
        }
    }

    defeat.ticks_left = defeat.ticks_left.saturating_sub(1);
    follow_camera(state);
    if defeat.ticks_left == 0 {
        state.defeat = None;
        log::info!("Boss defeat sequence finished");
        return StepOutcome::Victory;
    }
    state.defeat = Some(defeat);
    StepOutcome::Continue
}

fn advance_cosmetics(state: &mut SurvivorState) {
    particle::advance_particles(&mut state.particles);
    advance_explosions(&mut state.explosions);
}

fn follow_camera(state: &mut SurvivorState) {
    let trail_len = if state.effects.trails {
        state.quality.profile().trail_length(TRAIL_BASE)
    } else {
        0
    };
    state.player.record_trail(trail_len);
    state.camera.follow(state.player.pos);
}

/// Quality-scaled particle burst
fn emit(state: &mut SurvivorState, at: Vec2, base: usize, speed: f32, color: [f32; 4], kind: ParticleKind) {
    if !state.effects.particles {
        return;
    }
    let count = state.quality.profile().particle_count(base);
    particle::burst(
        &mut state.particles,
        at,
        count,
        speed,
        color,
        30.0,
        kind,
        state.ticks as u32,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survivor::enemy::Enemy;
    use crate::tuning::{QualityTuning, SurvivorTuning};

    fn state() -> SurvivorState {
        SurvivorState::new(&SurvivorTuning::default(), &QualityTuning::default(), 5, 9)
    }

    fn idle() -> SurvivorInput {
        SurvivorInput::default()
    }

    #[test]
    fn test_basic_weapon_kills_and_drops_xp() {
        let mut s = state();
        let id = s.spawner.next_id();
        s.enemies.push(Enemy::new(id, EnemyKind::Chase, Vec2::new(60.0, 0.0), 0.25, 1.0));
        for _ in 0..40 {
            tick(&mut s, &idle());
            if s.kills > 0 {
                break;
            }
        }
        assert_eq!(s.kills, 1);
        assert!(s.enemies.iter().all(|e| e.id != id));
        assert_eq!(s.orbs.active_count(), 1);
    }

    #[test]
    fn test_lethal_hit_delays_game_over() {
        let mut s = state();
        s.player.health = 1.0;
        let id = s.spawner.next_id();
        s.enemies.push(Enemy::new(id, EnemyKind::Tank, Vec2::new(5.0, 0.0), 100.0, 1.0));
        assert_eq!(tick(&mut s, &idle()), StepOutcome::Continue);
        assert_eq!(s.player.health, 0.0);
        let delay = s.tuning.game_over_delay_ticks;
        let mut steps = 0;
        loop {
            steps += 1;
            if tick(&mut s, &idle()) == StepOutcome::GameOver {
                break;
            }
            assert!(steps <= delay);
        }
        assert_eq!(steps, delay);
    }

    #[test]
    fn test_boss_kill_runs_defeat_sequence_then_victory() {
        let mut s = state();
        let stats = crate::survivor::spawner::boss_stats(&s.tuning, 0);
        let id = s.spawner.next_id();
        let mut boss = Enemy::boss(id, Vec2::new(400.0, 0.0), &stats, 0);
        boss.health = 1.0;
        s.enemies.push(boss);
        let minion = s.spawner.next_id();
        s.enemies.push(Enemy::new(minion, EnemyKind::Chase, Vec2::new(-500.0, 0.0), 100.0, 1.0));
        s.player.invulnerable = 10_000;
        s.enemies[0].take_damage(5.0);

        assert_eq!(tick(&mut s, &idle()), StepOutcome::Continue);
        assert_eq!(s.boss_kills, 1);
        assert!(s.enemies.is_empty(), "hazard field cleared");
        assert!(s.defeat.is_some());

        let mut steps = 0;
        while tick(&mut s, &idle()) != StepOutcome::Victory {
            steps += 1;
            assert!(steps < 1_000);
        }
        assert_eq!(steps + 1, s.tuning.boss_defeat_ticks as usize);
        assert!(s.spawner.next_boss_secs().is_some());
    }

    #[test]
    fn test_volley_fans_toward_target() {
        let mut pool = Pool::new(8);
        launch_volley(
            &mut pool,
            Volley {
                origin: Vec2::ZERO,
                count: 5,
                damage: 10.0,
            },
            Vec2::new(100.0, 0.0),
        );
        assert_eq!(pool.active_count(), 5);
        assert!(pool.iter().all(|(_, p)| p.owner == Owner::Enemy && p.vel.x > 0.0));
    }
}
