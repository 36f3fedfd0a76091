//! Survivor enemies and their movement AI

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::spawner::BossStats;

/// Distance at which flyers stop chasing and start circling
pub const ORBIT_RADIUS: f32 = 150.0;
/// Ticks between teleports
pub const TELEPORT_INTERVAL: u32 = 180;
/// Teleport destination ring around the player
pub const TELEPORT_MIN: f32 = 120.0;
pub const TELEPORT_MAX: f32 = 200.0;
/// Projectiles closer than this make dodgers sidestep
pub const DODGE_RADIUS: f32 = 80.0;
/// Strafing radius of the boss's middle phase
pub const BOSS_STRAFE_RADIUS: f32 = 250.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Chase,
    Dodge,
    Tank,
    Fly,
    Teleport,
    Boss,
}

/// Unscaled stats for a regular enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub health: f32,
    pub speed: f32,
    pub damage: f32,
    pub radius: f32,
    pub xp: f32,
}

impl EnemyKind {
    pub fn base_stats(self) -> EnemyStats {
        let (health, speed, damage, radius, xp) = match self {
            EnemyKind::Chase => (20.0, 1.4, 10.0, 12.0, 1.0),
            EnemyKind::Dodge => (15.0, 1.8, 8.0, 11.0, 2.0),
            EnemyKind::Tank => (80.0, 0.8, 20.0, 22.0, 5.0),
            EnemyKind::Fly => (12.0, 2.2, 6.0, 9.0, 2.0),
            EnemyKind::Teleport => (25.0, 1.2, 12.0, 13.0, 4.0),
            EnemyKind::Boss => (3_000.0, 1.2, 25.0, 60.0, 100.0),
        };
        EnemyStats {
            health,
            speed,
            damage,
            radius,
            xp,
        }
    }
}

/// Boss behaviour, keyed off remaining health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossPhase {
    /// Above two thirds: steady pursuit, small volleys
    Pursuit,
    /// Middle third: circles the player
    Strafe,
    /// Final third: fast charge, large volleys
    Enraged,
}

impl BossPhase {
    pub fn from_health_fraction(fraction: f32) -> Self {
        if fraction > 0.66 {
            BossPhase::Pursuit
        } else if fraction >= 0.33 {
            BossPhase::Strafe
        } else {
            BossPhase::Enraged
        }
    }

    pub fn volley_size(self) -> u32 {
        match self {
            BossPhase::Pursuit => 3,
            BossPhase::Strafe => 5,
            BossPhase::Enraged => 8,
        }
    }

    pub fn volley_interval(self) -> u32 {
        match self {
            BossPhase::Pursuit => 120,
            BossPhase::Strafe => 100,
            BossPhase::Enraged => 80,
        }
    }

    pub fn speed_factor(self) -> f32 {
        match self {
            BossPhase::Pursuit => 1.0,
            BossPhase::Strafe => 1.2,
            BossPhase::Enraged => 1.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BossState {
    pub phase: BossPhase,
    pub attack_timer: u32,
    /// Bosses defeated before this one spawned
    pub generation: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
    pub damage: f32,
    pub speed: f32,
    pub xp: f32,
    pub burn_ticks: u32,
    pub burn_damage: f32,
    /// Teleport countdown
    pub timer: u32,
    pub hit_flash: f32,
    pub boss: Option<BossState>,
}

impl Enemy {
    /// Regular enemy with time/boss scaling applied
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2, health_mult: f32, damage_mult: f32) -> Self {
        let s = kind.base_stats();
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            radius: s.radius,
            health: s.health * health_mult,
            max_health: s.health * health_mult,
            damage: s.damage * damage_mult,
            speed: s.speed,
            xp: s.xp,
            burn_ticks: 0,
            burn_damage: 0.0,
            timer: 0,
            hit_flash: 0.0,
            boss: None,
        }
    }

    pub fn boss(id: u32, pos: Vec2, stats: &BossStats, generation: u32) -> Self {
        Self {
            id,
            kind: EnemyKind::Boss,
            pos,
            vel: Vec2::ZERO,
            radius: stats.radius,
            health: stats.health,
            max_health: stats.health,
            damage: stats.damage,
            speed: stats.speed,
            xp: EnemyKind::Boss.base_stats().xp,
            burn_ticks: 0,
            burn_damage: 0.0,
            timer: 0,
            hit_flash: 0.0,
            boss: Some(BossState {
                phase: BossPhase::Pursuit,
                attack_timer: 0,
                generation,
            }),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn is_boss(&self) -> bool {
        self.kind == EnemyKind::Boss
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            (self.health / self.max_health).clamp(0.0, 1.0)
        }
    }

    /// Apply damage, flooring health at zero. Returns true only for the hit
    /// that takes the enemy from alive to dead.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.health = (self.health - amount).max(0.0);
        self.hit_flash = 1.0;
        !self.is_alive()
    }

    /// Refresh a burn, keeping the stronger of old and new
    pub fn ignite(&mut self, damage_per_tick: f32, ticks: u32) {
        self.burn_damage = self.burn_damage.max(damage_per_tick);
        self.burn_ticks = self.burn_ticks.max(ticks);
    }

    /// Tick the burn. Returns true if it killed the enemy.
    pub fn tick_burn(&mut self) -> bool {
        if self.burn_ticks == 0 {
            return false;
        }
        self.burn_ticks -= 1;
        let killed = self.take_damage(self.burn_damage);
        if self.burn_ticks == 0 {
            self.burn_damage = 0.0;
        }
        killed
    }
}

/// Boss missile request produced by the AI
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volley {
    pub origin: Vec2,
    pub count: u32,
    pub damage: f32,
}

/// Player projectile position and velocity, for dodging
pub type Threat = (Vec2, Vec2);

/// Advance one enemy's movement. Bosses may return a missile volley.
pub fn update_enemy<R: Rng>(
    enemy: &mut Enemy,
    player_pos: Vec2,
    threats: &[Threat],
    rng: &mut R,
) -> Option<Volley> {
    let to_player = player_pos - enemy.pos;
    let chase = to_player.normalize_or_zero();
    let mut volley = None;

    enemy.vel = match enemy.kind {
        EnemyKind::Chase | EnemyKind::Tank => chase * enemy.speed,
        EnemyKind::Dodge => match incoming_threat(enemy.pos, threats) {
            Some(dodge) => (chase * 0.5 + dodge * 0.8).normalize_or_zero() * enemy.speed * 1.2,
            None => chase * enemy.speed,
        },
        EnemyKind::Fly => {
            if to_player.length() > ORBIT_RADIUS {
                chase * enemy.speed
            } else {
                orbit_velocity(enemy.pos, player_pos, ORBIT_RADIUS - 10.0, 0.05, enemy.speed)
            }
        }
        EnemyKind::Teleport => {
            enemy.timer += 1;
            if enemy.timer >= TELEPORT_INTERVAL {
                enemy.timer = 0;
                let angle = rng.random_range(0.0..std::f32::consts::TAU);
                let dist = rng.random_range(TELEPORT_MIN..TELEPORT_MAX);
                enemy.pos = player_pos + Vec2::new(angle.cos(), angle.sin()) * dist;
                Vec2::ZERO
            } else {
                chase * enemy.speed
            }
        }
        EnemyKind::Boss => {
            let fraction = enemy.health_fraction();
            let speed = enemy.speed;
            let pos = enemy.pos;
            let damage = enemy.damage;
            match enemy.boss.as_mut() {
                Some(boss) => {
                    let phase = BossPhase::from_health_fraction(fraction);
                    if phase != boss.phase {
                        log::info!("Boss entered {:?} phase", phase);
                        boss.phase = phase;
                        boss.attack_timer = 0;
                    }
                    boss.attack_timer += 1;
                    if boss.attack_timer >= phase.volley_interval() {
                        boss.attack_timer = 0;
                        volley = Some(Volley {
                            origin: pos,
                            count: phase.volley_size(),
                            damage: damage * 0.6,
                        });
                    }
                    let speed = speed * phase.speed_factor();
                    match phase {
                        BossPhase::Strafe if to_player.length() < BOSS_STRAFE_RADIUS * 1.5 => {
                            orbit_velocity(pos, player_pos, BOSS_STRAFE_RADIUS, 0.02, speed)
                        }
                        _ => chase * speed,
                    }
                }
                None => chase * speed,
            }
        }
    };

    enemy.pos += enemy.vel;
    enemy.hit_flash *= 0.85;
    volley
}

/// Unit sidestep direction away from the nearest projectile heading this way
fn incoming_threat(pos: Vec2, threats: &[Threat]) -> Option<Vec2> {
    let (p, v) = threats
        .iter()
        .filter(|(p, v)| p.distance_squared(pos) < DODGE_RADIUS * DODGE_RADIUS && v.dot(pos - *p) > 0.0)
        .min_by(|a, b| a.0.distance_squared(pos).total_cmp(&b.0.distance_squared(pos)))?;
    let perp = Vec2::new(-v.y, v.x).normalize_or_zero();
    Some(if perp.dot(pos - *p) < 0.0 { -perp } else { perp })
}

/// Velocity that advances `pos` around `center` at `radius`
fn orbit_velocity(pos: Vec2, center: Vec2, radius: f32, step: f32, speed: f32) -> Vec2 {
    let offset = pos - center;
    let angle = offset.y.atan2(offset.x) + step;
    let target = center + Vec2::new(angle.cos(), angle.sin()) * radius;
    let to_target = target - pos;
    if to_target.length() <= speed {
        to_target
    } else {
        to_target.normalize_or_zero() * speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_death_registers_once() {
        let mut e = Enemy::new(1, EnemyKind::Chase, Vec2::ZERO, 1.0, 1.0);
        assert!(!e.take_damage(15.0));
        assert!(e.take_damage(15.0));
        assert_eq!(e.health, 0.0);
        assert!(!e.take_damage(15.0));
        assert_eq!(e.health, 0.0);
    }

    #[test]
    fn test_chaser_moves_toward_player() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut e = Enemy::new(1, EnemyKind::Chase, Vec2::new(100.0, 0.0), 1.0, 1.0);
        update_enemy(&mut e, Vec2::ZERO, &[], &mut rng);
        assert!((e.pos.x - (100.0 - 1.4)).abs() < 1e-4);
    }

    #[test]
    fn test_dodger_sidesteps_incoming_shot() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut e = Enemy::new(1, EnemyKind::Dodge, Vec2::new(100.0, 0.0), 1.0, 1.0);
        let threats = [(Vec2::new(60.0, 0.0), Vec2::new(8.0, 0.0))];
        update_enemy(&mut e, Vec2::ZERO, &threats, &mut rng);
        assert!(e.vel.y.abs() > 0.5, "should move off the shot's line");
    }

    #[test]
    fn test_flyer_orbits_inside_radius() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut e = Enemy::new(1, EnemyKind::Fly, Vec2::new(140.0, 0.0), 1.0, 1.0);
        for _ in 0..200 {
            update_enemy(&mut e, Vec2::ZERO, &[], &mut rng);
            let d = e.pos.length();
            assert!(d > 100.0 && d < 170.0, "orbit drifted to {d}");
        }
    }

    #[test]
    fn test_teleporter_jumps_near_player() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut e = Enemy::new(1, EnemyKind::Teleport, Vec2::new(5_000.0, 0.0), 1.0, 1.0);
        for _ in 0..TELEPORT_INTERVAL {
            update_enemy(&mut e, Vec2::ZERO, &[], &mut rng);
        }
        let d = e.pos.length();
        assert!((TELEPORT_MIN..=TELEPORT_MAX).contains(&d));
    }

    #[test]
    fn test_boss_phases_and_volleys() {
        assert_eq!(BossPhase::from_health_fraction(0.9), BossPhase::Pursuit);
        assert_eq!(BossPhase::from_health_fraction(0.5), BossPhase::Strafe);
        assert_eq!(BossPhase::from_health_fraction(0.1), BossPhase::Enraged);

        let mut rng = Pcg32::seed_from_u64(1);
        let stats = BossStats {
            health: 100.0,
            speed: 1.0,
            damage: 10.0,
            radius: 40.0,
        };
        let mut boss = Enemy::boss(9, Vec2::new(600.0, 0.0), &stats, 0);
        let volleys: Vec<Volley> = (0..240)
            .filter_map(|_| update_enemy(&mut boss, Vec2::ZERO, &[], &mut rng))
            .collect();
        assert_eq!(volleys.len(), 2);
        assert!(volleys.iter().all(|v| v.count == 3));

        boss.health = 20.0;
        let v = (0..80)
            .find_map(|_| update_enemy(&mut boss, Vec2::ZERO, &[], &mut rng))
            .unwrap();
        assert_eq!(v.count, 8);
        assert_eq!(boss.boss.unwrap().phase, BossPhase::Enraged);
    }
}
