//! Survivor player, input and passive upgrades

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::weapon::{Weapon, WeaponKind};
use crate::engine::game_loop::FrameInput;
use crate::tuning::SurvivorTuning;

pub const MAX_PASSIVE_STACKS: u32 = 5;
/// Trail length at full quality
pub const TRAIL_BASE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Passive {
    Armor,
    MaxHealth,
    Speed,
    Regeneration,
    Magnet,
    Critical,
    DashCooldown,
    FireRate,
}

impl Passive {
    pub const ALL: [Passive; 8] = [
        Passive::Armor,
        Passive::MaxHealth,
        Passive::Speed,
        Passive::Regeneration,
        Passive::Magnet,
        Passive::Critical,
        Passive::DashCooldown,
        Passive::FireRate,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Passive::Armor => "Armor",
            Passive::MaxHealth => "Max Health",
            Passive::Speed => "Speed",
            Passive::Regeneration => "Regeneration",
            Passive::Magnet => "Magnet",
            Passive::Critical => "Critical Hit",
            Passive::DashCooldown => "Dash Cooldown",
            Passive::FireRate => "Fire Rate",
        }
    }

    fn index(self) -> usize {
        Passive::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }
}

/// Stack counts per passive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Passives {
    stacks: [u32; 8],
}

impl Passives {
    pub fn stacks(&self, p: Passive) -> u32 {
        self.stacks[p.index()]
    }

    pub fn can_add(&self, p: Passive) -> bool {
        self.stacks(p) < MAX_PASSIVE_STACKS
    }

    pub fn add(&mut self, p: Passive) -> bool {
        if !self.can_add(p) {
            return false;
        }
        self.stacks[p.index()] += 1;
        true
    }

    /// Fraction of incoming damage absorbed
    pub fn armor(&self) -> f32 {
        0.08 * self.stacks(Passive::Armor) as f32
    }

    pub fn speed_mult(&self) -> f32 {
        1.0 + 0.1 * self.stacks(Passive::Speed) as f32
    }

    pub fn regen_per_tick(&self) -> f32 {
        0.02 * self.stacks(Passive::Regeneration) as f32
    }

    pub fn magnet_mult(&self) -> f32 {
        1.0 + 0.3 * self.stacks(Passive::Magnet) as f32
    }

    pub fn crit_chance(&self, per_stack: f32) -> f32 {
        (per_stack * self.stacks(Passive::Critical) as f32).min(1.0)
    }

    pub fn dash_cooldown_mult(&self) -> f32 {
        0.88f32.powi(self.stacks(Passive::DashCooldown) as i32)
    }

    pub fn fire_rate_mult(&self) -> f32 {
        0.92f32.powi(self.stacks(Passive::FireRate) as i32)
    }
}

/// Input consumed by the next tick
#[derive(Debug, Clone, Default)]
pub struct SurvivorInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Virtual joystick, each axis in [-1, 1]
    pub joystick: Vec2,
    /// Dash pressed since the last tick
    pub dash: bool,
}

impl SurvivorInput {
    /// Keys plus joystick, summed without normalizing
    pub fn movement(&self) -> Vec2 {
        let keys = Vec2::new(
            (self.right as i32 - self.left as i32) as f32,
            (self.down as i32 - self.up as i32) as f32,
        );
        keys + self.joystick.clamp(Vec2::splat(-1.0), Vec2::splat(1.0))
    }
}

impl FrameInput for SurvivorInput {
    fn clear_edges(&mut self) {
        self.dash = false;
    }
}

#[derive(Debug, Clone)]
pub struct SurvivorPlayer {
    pub pos: Vec2,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
    pub invulnerable: u32,
    pub dash_cooldown: u32,
    /// Last non-zero movement direction
    pub facing: Vec2,
    pub level: u32,
    pub xp: f32,
    pub weapons: Vec<Weapon>,
    pub passives: Passives,
    /// Recent positions, newest first
    pub trail: VecDeque<Vec2>,
}

impl SurvivorPlayer {
    pub fn new(t: &SurvivorTuning) -> Self {
        Self {
            pos: Vec2::ZERO,
            radius: t.player_radius,
            health: t.player_max_health,
            max_health: t.player_max_health,
            invulnerable: 0,
            dash_cooldown: 0,
            facing: Vec2::X,
            level: 1,
            xp: 0.0,
            weapons: vec![Weapon::new(WeaponKind::Basic)],
            passives: Passives::default(),
            trail: VecDeque::with_capacity(TRAIL_BASE),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn xp_to_next(&self, t: &SurvivorTuning) -> f32 {
        t.xp_base * t.xp_growth.powi(self.level as i32 - 1)
    }

    /// Apply contact or missile damage after armor. Health floors at zero.
    /// Returns true when this hit killed the player.
    pub fn take_damage(&mut self, amount: f32, invulnerability_ticks: u32) -> bool {
        if !self.is_alive() || self.invulnerable > 0 {
            return false;
        }
        let reduced = amount * (1.0 - self.passives.armor()).max(0.0);
        self.health = (self.health - reduced).max(0.0);
        self.invulnerable = invulnerability_ticks;
        !self.is_alive()
    }

    pub fn heal(&mut self, amount: f32) {
        if self.is_alive() {
            self.health = (self.health + amount).min(self.max_health);
        }
    }

    /// Move by the summed input direction
    pub fn apply_movement(&mut self, input: &SurvivorInput, base_speed: f32) {
        let dir = input.movement();
        if dir != Vec2::ZERO {
            self.facing = dir.normalize_or(self.facing);
        }
        self.pos += dir * base_speed * self.passives.speed_mult();
    }

    /// Instant hop along the facing direction. Returns true if it happened.
    pub fn try_dash(&mut self, input: &SurvivorInput, t: &SurvivorTuning) -> bool {
        if !input.dash || self.dash_cooldown > 0 {
            return false;
        }
        self.pos += self.facing * t.dash_distance;
        self.invulnerable = self.invulnerable.max(t.dash_invulnerability_ticks);
        self.dash_cooldown =
            (t.dash_cooldown_ticks as f32 * self.passives.dash_cooldown_mult()).round() as u32;
        true
    }

    pub fn record_trail(&mut self, max_len: usize) {
        self.trail.push_front(self.pos);
        self.trail.truncate(max_len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagonal_is_faster() {
        let input = SurvivorInput {
            right: true,
            down: true,
            ..Default::default()
        };
        let m = input.movement();
        assert_eq!(m, Vec2::new(1.0, 1.0));
        assert!(m.length() > 1.0);

        let mixed = SurvivorInput {
            right: true,
            joystick: Vec2::new(0.5, 0.0),
            ..Default::default()
        };
        assert_eq!(mixed.movement(), Vec2::new(1.5, 0.0));
    }

    #[test]
    fn test_dash_grants_invulnerability_and_cooldown() {
        let t = SurvivorTuning::default();
        let mut p = SurvivorPlayer::new(&t);
        let input = SurvivorInput {
            left: true,
            dash: true,
            ..Default::default()
        };
        p.apply_movement(&input, t.player_speed);
        assert!(p.try_dash(&input, &t));
        assert!((p.pos.x - (-t.player_speed - t.dash_distance)).abs() < 1e-4);
        assert_eq!(p.invulnerable, t.dash_invulnerability_ticks);
        assert_eq!(p.dash_cooldown, t.dash_cooldown_ticks);
        assert!(!p.try_dash(&input, &t));
    }

    #[test]
    fn test_armor_and_health_floor() {
        let t = SurvivorTuning::default();
        let mut p = SurvivorPlayer::new(&t);
        p.passives.add(Passive::Armor);
        p.passives.add(Passive::Armor);
        assert!(!p.take_damage(50.0, 0));
        assert!((p.health - (100.0 - 50.0 * 0.84)).abs() < 1e-3);
        assert!(p.take_damage(1_000.0, 10));
        assert_eq!(p.health, 0.0);
        assert!(!p.take_damage(10.0, 0), "death registers once");
        assert_eq!(p.health, 0.0);
    }

    #[test]
    fn test_passive_cap() {
        let mut passives = Passives::default();
        for _ in 0..MAX_PASSIVE_STACKS {
            assert!(passives.add(Passive::Magnet));
        }
        assert!(!passives.add(Passive::Magnet));
        assert_eq!(passives.stacks(Passive::Magnet), MAX_PASSIVE_STACKS);
    }
}
