//! Enemy waves and boss scheduling
//!
//! Regular enemies arrive on a timer whose interval shrinks with elapsed
//! time, up to a concurrency cap, on a ring around the player. Kinds are
//! drawn from a weighted table over the kinds unlocked so far.
//!
//! The first boss appears once at a fixed time. Each defeat schedules a
//! stronger repeat after a delay. Regular enemy scaling follows elapsed
//! time until the first boss falls; at that moment the time-based
//! multipliers are frozen and from then on grow with the boss count only.

use glam::Vec2;
use rand::Rng;

use super::enemy::{Enemy, EnemyKind};
use crate::engine::game_loop::TICK_RATE;
use crate::tuning::SurvivorTuning;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BossStats {
    pub health: f32,
    pub speed: f32,
    pub damage: f32,
    pub radius: f32,
}

/// Stats for a boss spawned after `defeated` earlier bosses
pub fn boss_stats(t: &SurvivorTuning, defeated: u32) -> BossStats {
    let k = defeated as i32;
    BossStats {
        health: t.boss_health * t.boss_health_multiplier.powi(k),
        speed: t.boss_speed * t.boss_speed_multiplier.powi(k),
        damage: t.boss_damage * t.boss_damage_multiplier.powi(k),
        radius: t.boss_radius * t.boss_size_multiplier.powi(k),
    }
}

/// Ticks between regular spawns at `elapsed_secs`
pub fn spawn_interval(t: &SurvivorTuning, elapsed_secs: f32) -> f32 {
    (t.spawn_interval_start - elapsed_secs * t.spawn_interval_decay).max(t.spawn_interval_min)
}

/// Point on a circle of `radius` around `center`
pub fn ring_position<R: Rng>(center: Vec2, radius: f32, rng: &mut R) -> Vec2 {
    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    center + Vec2::new(angle.cos(), angle.sin()) * radius
}

/// Weighted pick among kinds unlocked at `elapsed_secs`
pub fn pick_kind<R: Rng>(t: &SurvivorTuning, elapsed_secs: f32, rng: &mut R) -> Option<EnemyKind> {
    let unlocked = || {
        t.spawn_table
            .iter()
            .filter(move |e| e.weight > 0 && elapsed_secs >= e.unlock_secs && e.kind != EnemyKind::Boss)
    };
    let total: u32 = unlocked().map(|e| e.weight).sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.random_range(0..total);
    for entry in unlocked() {
        if roll < entry.weight {
            return Some(entry.kind);
        }
        roll -= entry.weight;
    }
    None
}

/// Events from one spawner update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpawnReport {
    pub spawned: u32,
    pub boss_spawned: bool,
}

#[derive(Debug, Clone)]
pub struct Spawner {
    timer: f32,
    next_id: u32,
    next_boss_secs: Option<f32>,
    bosses_defeated: u32,
    /// Time-based multipliers captured when the first boss fell
    frozen_scaling: Option<(f32, f32)>,
}

impl Spawner {
    pub fn new(t: &SurvivorTuning) -> Self {
        Self {
            timer: 0.0,
            next_id: 1,
            next_boss_secs: Some(t.boss_spawn_secs),
            bosses_defeated: 0,
            frozen_scaling: None,
        }
    }

    pub fn reset(&mut self, t: &SurvivorTuning) {
        *self = Self::new(t);
    }

    pub fn bosses_defeated(&self) -> u32 {
        self.bosses_defeated
    }

    pub fn next_boss_secs(&self) -> Option<f32> {
        self.next_boss_secs
    }

    pub fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// (health, damage) multipliers for regular enemies
    pub fn scaling(&self, t: &SurvivorTuning, elapsed_secs: f32) -> (f32, f32) {
        match self.frozen_scaling {
            None => {
                let minutes = elapsed_secs / 60.0;
                (
                    1.0 + t.health_per_minute * minutes,
                    1.0 + t.damage_per_minute * minutes,
                )
            }
            Some((health, damage)) => {
                let k = self.bosses_defeated.saturating_sub(1) as i32;
                (
                    health * t.post_boss_health_growth.powi(k),
                    damage * t.post_boss_damage_growth.powi(k),
                )
            }
        }
    }

    /// Advance one tick: maybe spawn the boss, maybe spawn a regular enemy
    pub fn update<R: Rng>(
        &mut self,
        t: &SurvivorTuning,
        elapsed_secs: f32,
        player_pos: Vec2,
        enemies: &mut Vec<Enemy>,
        rng: &mut R,
    ) -> SpawnReport {
        let mut report = SpawnReport::default();

        if let Some(at) = self.next_boss_secs {
            if elapsed_secs >= at && !enemies.iter().any(Enemy::is_boss) {
                let stats = boss_stats(t, self.bosses_defeated);
                let id = self.next_id();
                let pos = ring_position(player_pos, t.spawn_ring_radius, rng);
                enemies.push(Enemy::boss(id, pos, &stats, self.bosses_defeated));
                self.next_boss_secs = None;
                report.boss_spawned = true;
                log::info!(
                    "Boss #{} spawned at {:.0}s ({:.0} hp)",
                    self.bosses_defeated + 1,
                    elapsed_secs,
                    stats.health
                );
            }
        }

        self.timer += 1.0;
        if self.timer >= spawn_interval(t, elapsed_secs) {
            self.timer = 0.0;
            let regular = enemies.iter().filter(|e| !e.is_boss()).count();
            if regular < t.max_enemies {
                if let Some(kind) = pick_kind(t, elapsed_secs, rng) {
                    let (health, damage) = self.scaling(t, elapsed_secs);
                    let id = self.next_id();
                    let pos = ring_position(player_pos, t.spawn_ring_radius, rng);
                    enemies.push(Enemy::new(id, kind, pos, health, damage));
                    report.spawned += 1;
                }
            }
        }
        report
    }

    /// Record a boss kill and schedule the next one
    pub fn on_boss_defeated(&mut self, t: &SurvivorTuning, elapsed_secs: f32) {
        if self.frozen_scaling.is_none() {
            self.frozen_scaling = Some(self.scaling(t, elapsed_secs));
        }
        self.bosses_defeated += 1;
        self.next_boss_secs = Some(elapsed_secs + t.boss_respawn_delay_secs);
        log::info!(
            "Boss defeated ({} total), next in {:.0}s",
            self.bosses_defeated,
            t.boss_respawn_delay_secs
        );
    }
}

/// Convert a tick count to seconds
pub fn ticks_to_secs(ticks: u64) -> f32 {
    (ticks as f64 / TICK_RATE) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_interval_shrinks_to_floor() {
        let t = SurvivorTuning::default();
        assert_eq!(spawn_interval(&t, 0.0), 90.0);
        assert!(spawn_interval(&t, 60.0) < 90.0);
        assert_eq!(spawn_interval(&t, 10_000.0), t.spawn_interval_min);
    }

    #[test]
    fn test_only_unlocked_kinds_spawn() {
        let t = SurvivorTuning::default();
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..200 {
            assert_eq!(pick_kind(&t, 10.0, &mut rng), Some(EnemyKind::Chase));
        }
        let late: Vec<EnemyKind> = (0..500).filter_map(|_| pick_kind(&t, 600.0, &mut rng)).collect();
        assert!(late.contains(&EnemyKind::Teleport));
        assert!(late.contains(&EnemyKind::Tank));
    }

    #[test]
    fn test_spawn_ring_and_cap() {
        let mut t = SurvivorTuning::default();
        t.max_enemies = 3;
        let mut s = Spawner::new(&t);
        let mut rng = Pcg32::seed_from_u64(2);
        let mut enemies = Vec::new();
        let center = Vec2::new(40.0, -20.0);
        for _ in 0..2_000 {
            s.update(&t, 1.0, center, &mut enemies, &mut rng);
        }
        assert_eq!(enemies.len(), 3);
        for e in &enemies {
            assert!((e.pos.distance(center) - t.spawn_ring_radius).abs() < 0.1);
        }
    }

    #[test]
    fn test_boss_spawns_once_then_after_delay() {
        let t = SurvivorTuning::default();
        let mut s = Spawner::new(&t);
        let mut rng = Pcg32::seed_from_u64(2);
        let mut enemies = Vec::new();
        assert!(!s.update(&t, 299.9, Vec2::ZERO, &mut enemies, &mut rng).boss_spawned);
        assert!(s.update(&t, 300.0, Vec2::ZERO, &mut enemies, &mut rng).boss_spawned);
        enemies.retain(|e| !e.is_boss());
        assert!(!s.update(&t, 301.0, Vec2::ZERO, &mut enemies, &mut rng).boss_spawned);

        s.on_boss_defeated(&t, 320.0);
        assert_eq!(s.next_boss_secs(), Some(380.0));
        assert!(!s.update(&t, 379.0, Vec2::ZERO, &mut enemies, &mut rng).boss_spawned);
        assert!(s.update(&t, 380.0, Vec2::ZERO, &mut enemies, &mut rng).boss_spawned);
        let boss = enemies.iter().find(|e| e.is_boss()).unwrap();
        assert!((boss.max_health - t.boss_health * t.boss_health_multiplier).abs() < 1e-2);
    }

    #[test]
    fn test_scaling_freezes_then_switches_basis() {
        let t = SurvivorTuning::default();
        let mut s = Spawner::new(&t);
        let at_defeat = s.scaling(&t, 330.0);
        assert!(at_defeat.0 > 1.0);
        s.on_boss_defeated(&t, 330.0);
        // Continuous at the seam, then flat in time
        assert_eq!(s.scaling(&t, 330.0), at_defeat);
        assert_eq!(s.scaling(&t, 1_000.0), at_defeat);
        s.on_boss_defeated(&t, 500.0);
        let (h, d) = s.scaling(&t, 500.0);
        assert!((h - at_defeat.0 * t.post_boss_health_growth).abs() < 1e-4);
        assert!((d - at_defeat.1 * t.post_boss_damage_growth).abs() < 1e-4);
    }

    #[test]
    fn test_boss_stats_grow() {
        let t = SurvivorTuning::default();
        let a = boss_stats(&t, 0);
        let b = boss_stats(&t, 1);
        assert!(b.health > a.health && b.damage > a.damage && b.speed >= a.speed);
        assert_eq!(a.health, t.boss_health);
    }
}
