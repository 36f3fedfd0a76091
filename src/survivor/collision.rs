//! Survivor contact resolution
//!
//! Iteration is insertion order throughout. Every hit in a tick is applied;
//! the only debounce is the per-projectile `hits` list used by pierce and
//! chain. Exact circle tests are gated by a Manhattan pre-filter.

use glam::Vec2;
use rand::Rng;

use super::enemy::{Enemy, EnemyKind};
use super::player::SurvivorPlayer;
use super::projectile::{Explosion, Owner, Projectile, ProjectileKind};
use crate::engine::geometry::{circles_overlap, manhattan};
use crate::engine::pool::Pool;

/// Burn duration applied by incendiary hits
pub const BURN_TICKS: u32 = 60;
/// Fraction of the projectile's damage dealt by its blast
pub const BLAST_DAMAGE_FRACTION: f32 = 0.5;
/// Lifetime of the blast ring visual
pub const EXPLOSION_VISUAL_TICKS: f32 = 20.0;

/// Area damage queued during the projectile pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blast {
    pub pos: Vec2,
    pub radius: f32,
    pub damage: f32,
}

/// Critical hit parameters for this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crit {
    pub chance: f32,
    pub multiplier: f32,
}

impl Crit {
    pub const NONE: Crit = Crit {
        chance: 0.0,
        multiplier: 1.0,
    };

    fn roll<R: Rng>(&self, rng: &mut R) -> f32 {
        if self.chance > 0.0 && rng.random::<f32>() < self.chance {
            self.multiplier
        } else {
            1.0
        }
    }
}

/// An enemy removed this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kill {
    pub pos: Vec2,
    pub kind: EnemyKind,
    pub radius: f32,
    pub xp: f32,
}

/// What happened to the player this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerHits {
    pub damaged: bool,
    pub killed: bool,
}

/// Sum of radii with slack so the Manhattan test never rejects a real overlap
#[inline]
fn broad_phase(a: Vec2, b: Vec2, reach: f32) -> bool {
    manhattan(a, b) <= reach * std::f32::consts::SQRT_2
}

/// Player projectiles against enemies. Queues blasts for explosive
/// projectiles and resolves chain bolts once.
pub fn resolve_player_projectiles<R: Rng>(
    projectiles: &mut Pool<Projectile>,
    enemies: &mut [Enemy],
    crit: Crit,
    rng: &mut R,
    blasts: &mut Vec<Blast>,
) {
    projectiles.retain(|p| {
        if p.owner != Owner::Player {
            return true;
        }
        if p.kind == ProjectileKind::Chain {
            if !p.chain_resolved {
                resolve_chain(p, enemies, crit, rng, blasts);
            }
            return true;
        }

        for e in enemies.iter_mut() {
            if !e.is_alive() || p.hits.contains(&e.id) {
                continue;
            }
            if !broad_phase(p.pos, e.pos, p.radius + e.radius)
                || !circles_overlap(p.pos, p.radius, e.pos, e.radius)
            {
                continue;
            }

            e.take_damage(p.damage * crit.roll(rng));
            if p.burn_damage > 0.0 {
                e.ignite(p.burn_damage, BURN_TICKS);
            }
            p.hits.push(e.id);

            if p.explosion_radius > 0.0 {
                blasts.push(Blast {
                    pos: p.pos,
                    radius: p.explosion_radius,
                    damage: p.damage * BLAST_DAMAGE_FRACTION,
                });
                return false;
            }
            if p.pierce == 0 {
                return false;
            }
            p.pierce -= 1;
        }
        true
    });
}

/// Hop from the first target to the nearest unhit enemy within
/// `chain_radius` of the previous one, `chain` times at most
fn resolve_chain<R: Rng>(
    p: &mut Projectile,
    enemies: &mut [Enemy],
    crit: Crit,
    rng: &mut R,
    blasts: &mut Vec<Blast>,
) {
    p.chain_resolved = true;
    let first = p
        .target
        .and_then(|id| enemies.iter().position(|e| e.id == id && e.is_alive()))
        .or_else(|| nearest_unhit(enemies, p.pos, p.chain_radius, &p.hits));
    let Some(mut current) = first else {
        return;
    };
    p.chain_points.push(p.pos);

    for _ in 0..=p.chain {
        let e = &mut enemies[current];
        e.take_damage(p.damage * crit.roll(rng));
        p.hits.push(e.id);
        p.chain_points.push(e.pos);
        if p.explosion_radius > 0.0 {
            blasts.push(Blast {
                pos: e.pos,
                radius: p.explosion_radius,
                damage: p.damage * BLAST_DAMAGE_FRACTION,
            });
        }
        let from = e.pos;
        match nearest_unhit(enemies, from, p.chain_radius, &p.hits) {
            Some(next) => current = next,
            None => break,
        }
    }
}

fn nearest_unhit(enemies: &[Enemy], from: Vec2, radius: f32, hits: &[u32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, e) in enemies.iter().enumerate() {
        if !e.is_alive() || hits.contains(&e.id) {
            continue;
        }
        let d = e.pos.distance_squared(from);
        if d > radius * radius {
            continue;
        }
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}

/// Apply queued area damage and spawn the blast visuals
pub fn apply_blasts(blasts: &mut Vec<Blast>, enemies: &mut [Enemy], explosions: &mut Pool<Explosion>) {
    for blast in blasts.drain(..) {
        for e in enemies.iter_mut().filter(|e| e.is_alive()) {
            if circles_overlap(blast.pos, blast.radius, e.pos, e.radius) {
                e.take_damage(blast.damage);
            }
        }
        explosions.spawn(Explosion {
            pos: blast.pos,
            radius: blast.radius,
            life: EXPLOSION_VISUAL_TICKS,
            max_life: EXPLOSION_VISUAL_TICKS,
        });
    }
}

/// Enemy missiles and enemy bodies against the player
pub fn resolve_player_hits(
    player: &mut SurvivorPlayer,
    enemies: &[Enemy],
    projectiles: &mut Pool<Projectile>,
    invulnerability_ticks: u32,
) -> PlayerHits {
    let mut hits = PlayerHits::default();
    let before = player.health;

    projectiles.retain(|p| {
        if p.owner != Owner::Enemy {
            return true;
        }
        if !circles_overlap(p.pos, p.radius, player.pos, player.radius) {
            return true;
        }
        hits.killed |= player.take_damage(p.damage, invulnerability_ticks);
        false
    });

    for e in enemies.iter().filter(|e| e.is_alive()) {
        if !broad_phase(player.pos, e.pos, player.radius + e.radius) {
            continue;
        }
        if circles_overlap(player.pos, player.radius, e.pos, e.radius) {
            hits.killed |= player.take_damage(e.damage, invulnerability_ticks);
        }
    }

    hits.damaged = player.health < before;
    hits
}

/// Remove dead enemies, reporting each exactly once
pub fn drain_dead(enemies: &mut Vec<Enemy>, kills: &mut Vec<Kill>) {
    enemies.retain(|e| {
        if e.is_alive() {
            return true;
        }
        kills.push(Kill {
            pos: e.pos,
            kind: e.kind,
            radius: e.radius,
            xp: e.xp,
        });
        false
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::SurvivorTuning;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn chaser(id: u32, x: f32, y: f32) -> Enemy {
        Enemy::new(id, EnemyKind::Chase, Vec2::new(x, y), 1.0, 1.0)
    }

    fn shot(pos: Vec2, damage: f32, pierce: u32) -> Projectile {
        Projectile {
            pos,
            damage,
            pierce,
            life: 30,
            radius: 4.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_projectile_consumed_without_pierce() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut pool: Pool<Projectile> = Pool::new(4);
        pool.spawn(shot(Vec2::ZERO, 5.0, 0));
        let mut enemies = vec![chaser(1, 5.0, 0.0), chaser(2, -5.0, 0.0)];
        let mut blasts = Vec::new();
        resolve_player_projectiles(&mut pool, &mut enemies, Crit::NONE, &mut rng, &mut blasts);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(enemies[0].health, 15.0);
        assert_eq!(enemies[1].health, 20.0, "first in insertion order takes the hit");
    }

    #[test]
    fn test_pierce_hits_each_enemy_once() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut pool: Pool<Projectile> = Pool::new(4);
        pool.spawn(shot(Vec2::ZERO, 5.0, 3));
        let mut enemies = vec![chaser(1, 5.0, 0.0), chaser(2, -5.0, 0.0)];
        let mut blasts = Vec::new();
        for _ in 0..3 {
            resolve_player_projectiles(&mut pool, &mut enemies, Crit::NONE, &mut rng, &mut blasts);
        }
        assert_eq!(pool.active_count(), 1);
        assert_eq!(enemies[0].health, 15.0);
        assert_eq!(enemies[1].health, 15.0);
    }

    #[test]
    fn test_guaranteed_crit_doubles_damage() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut pool: Pool<Projectile> = Pool::new(4);
        pool.spawn(shot(Vec2::ZERO, 5.0, 0));
        let mut enemies = vec![chaser(1, 0.0, 0.0)];
        let crit = Crit {
            chance: 1.0,
            multiplier: 2.0,
        };
        resolve_player_projectiles(&mut pool, &mut enemies, crit, &mut rng, &mut Vec::new());
        assert_eq!(enemies[0].health, 10.0);
    }

    #[test]
    fn test_explosive_hit_damages_neighbours() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut pool: Pool<Projectile> = Pool::new(4);
        let mut plasma = shot(Vec2::ZERO, 10.0, 0);
        plasma.explosion_radius = 60.0;
        pool.spawn(plasma);
        let mut enemies = vec![chaser(1, 5.0, 0.0), chaser(2, 40.0, 0.0), chaser(3, 300.0, 0.0)];
        let mut blasts = Vec::new();
        let mut explosions: Pool<Explosion> = Pool::new(4);
        resolve_player_projectiles(&mut pool, &mut enemies, Crit::NONE, &mut rng, &mut blasts);
        assert_eq!(blasts.len(), 1);
        apply_blasts(&mut blasts, &mut enemies, &mut explosions);
        assert!(blasts.is_empty());
        assert_eq!(enemies[0].health, 5.0);
        assert_eq!(enemies[1].health, 15.0);
        assert_eq!(enemies[2].health, 20.0);
        assert_eq!(explosions.active_count(), 1);
    }

    #[test]
    fn test_chain_hops_to_nearest_unhit() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut pool: Pool<Projectile> = Pool::new(4);
        let h = pool.spawn(Projectile {
            pos: Vec2::ZERO,
            damage: 5.0,
            life: 12,
            kind: ProjectileKind::Chain,
            chain: 2,
            chain_radius: 150.0,
            target: Some(1),
            ..Default::default()
        });
        let mut enemies = vec![
            chaser(1, 0.0, 0.0),
            chaser(2, 400.0, 0.0),
            chaser(3, 100.0, 0.0),
            chaser(4, 220.0, 0.0),
        ];
        resolve_player_projectiles(&mut pool, &mut enemies, Crit::NONE, &mut rng, &mut Vec::new());
        let bolt = pool.get(h).unwrap();
        assert!(bolt.chain_resolved);
        assert_eq!(bolt.hits, vec![1, 3, 4]);
        assert_eq!(enemies[1].health, 20.0, "out of hop range");

        // Resolved bolts linger without hitting again
        resolve_player_projectiles(&mut pool, &mut enemies, Crit::NONE, &mut rng, &mut Vec::new());
        assert_eq!(enemies[0].health, 15.0);
    }

    #[test]
    fn test_contact_respects_invulnerability() {
        let t = SurvivorTuning::default();
        let mut player = SurvivorPlayer::new(&t);
        let enemies = vec![chaser(1, 5.0, 0.0), chaser(2, -5.0, 0.0)];
        let mut pool: Pool<Projectile> = Pool::new(4);
        let hits = resolve_player_hits(&mut player, &enemies, &mut pool, 60);
        assert!(hits.damaged && !hits.killed);
        assert_eq!(player.health, 90.0, "second contact lands during invulnerability");
        let again = resolve_player_hits(&mut player, &enemies, &mut pool, 60);
        assert!(!again.damaged);
    }

    #[test]
    fn test_enemy_missile_consumed_on_contact() {
        let t = SurvivorTuning::default();
        let mut player = SurvivorPlayer::new(&t);
        player.invulnerable = 30;
        let mut pool: Pool<Projectile> = Pool::new(4);
        pool.spawn(Projectile {
            owner: Owner::Enemy,
            kind: ProjectileKind::BossMissile,
            radius: 6.0,
            damage: 15.0,
            life: 100,
            ..Default::default()
        });
        let hits = resolve_player_hits(&mut player, &[], &mut pool, 60);
        assert_eq!(pool.active_count(), 0);
        assert!(!hits.damaged);
    }

    #[test]
    fn test_dead_enemies_drain_once() {
        let mut enemies = vec![chaser(1, 0.0, 0.0), chaser(2, 0.0, 0.0)];
        enemies[0].take_damage(100.0);
        let mut kills = Vec::new();
        drain_dead(&mut enemies, &mut kills);
        drain_dead(&mut enemies, &mut kills);
        assert_eq!(kills.len(), 1);
        assert_eq!(enemies.len(), 1);
        assert_eq!(enemies[0].id, 2);
    }
}
