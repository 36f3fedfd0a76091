//! Weapons, firing and merges

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::Enemy;
use super::projectile::{Owner, Projectile, ProjectileKind};
use crate::engine::pool::Pool;

pub const MAX_WEAPON_LEVEL: u32 = 8;
/// Search radius for chain hops
pub const CHAIN_RADIUS: f32 = 150.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Basic,
    Spread,
    Laser,
    Plasma,
    Shotgun,
    Lightning,
    Flamethrower,
    Railgun,
    Missiles,
    /// Laser + Missiles
    HomingLaser,
    /// Lightning + Plasma
    Shockburst,
}

impl WeaponKind {
    /// Kinds that can be offered as new weapons
    pub const OFFERABLE: [WeaponKind; 9] = [
        WeaponKind::Basic,
        WeaponKind::Spread,
        WeaponKind::Laser,
        WeaponKind::Plasma,
        WeaponKind::Shotgun,
        WeaponKind::Lightning,
        WeaponKind::Flamethrower,
        WeaponKind::Railgun,
        WeaponKind::Missiles,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WeaponKind::Basic => "Blaster",
            WeaponKind::Spread => "Spread Shot",
            WeaponKind::Laser => "Laser",
            WeaponKind::Plasma => "Plasma",
            WeaponKind::Shotgun => "Shotgun",
            WeaponKind::Lightning => "Lightning",
            WeaponKind::Flamethrower => "Flamethrower",
            WeaponKind::Railgun => "Railgun",
            WeaponKind::Missiles => "Missiles",
            WeaponKind::HomingLaser => "Homing Laser",
            WeaponKind::Shockburst => "Shockburst",
        }
    }

    pub fn is_merged(self) -> bool {
        matches!(self, WeaponKind::HomingLaser | WeaponKind::Shockburst)
    }

    fn projectile_kind(self) -> ProjectileKind {
        match self {
            WeaponKind::Basic | WeaponKind::Spread => ProjectileKind::Bullet,
            WeaponKind::Laser => ProjectileKind::Laser,
            WeaponKind::Plasma => ProjectileKind::Plasma,
            WeaponKind::Shotgun => ProjectileKind::Pellet,
            WeaponKind::Lightning | WeaponKind::Shockburst => ProjectileKind::Chain,
            WeaponKind::Flamethrower => ProjectileKind::Flame,
            WeaponKind::Railgun => ProjectileKind::Rail,
            WeaponKind::Missiles => ProjectileKind::Missile,
            WeaponKind::HomingLaser => ProjectileKind::HomingLaser,
        }
    }

    fn base_stats(self) -> WeaponStats {
        let s = WeaponStats::default();
        match self {
            WeaponKind::Basic => WeaponStats {
                damage: 10.0,
                fire_rate: 30.0,
                range: 400.0,
                projectile_speed: 8.0,
                ..s
            },
            WeaponKind::Spread => WeaponStats {
                damage: 8.0,
                fire_rate: 45.0,
                range: 350.0,
                projectile_speed: 7.0,
                projectile_count: 3,
                spread: 0.5,
                ..s
            },
            WeaponKind::Laser => WeaponStats {
                damage: 15.0,
                fire_rate: 40.0,
                range: 500.0,
                projectile_speed: 14.0,
                pierce: 3,
                ..s
            },
            WeaponKind::Plasma => WeaponStats {
                damage: 20.0,
                fire_rate: 60.0,
                range: 400.0,
                projectile_speed: 6.0,
                explosion_radius: 60.0,
                ..s
            },
            WeaponKind::Shotgun => WeaponStats {
                damage: 6.0,
                fire_rate: 50.0,
                range: 250.0,
                projectile_speed: 9.0,
                projectile_count: 6,
                spread: 0.6,
                lifetime: 40,
                ..s
            },
            WeaponKind::Lightning => WeaponStats {
                damage: 18.0,
                fire_rate: 55.0,
                range: 350.0,
                projectile_speed: 0.0,
                chain: 4,
                lifetime: 12,
                ..s
            },
            WeaponKind::Flamethrower => WeaponStats {
                damage: 3.0,
                fire_rate: 6.0,
                range: 150.0,
                projectile_speed: 5.0,
                pierce: 2,
                lifetime: 30,
                burn: 0.5,
                ..s
            },
            WeaponKind::Railgun => WeaponStats {
                damage: 60.0,
                fire_rate: 90.0,
                range: 700.0,
                projectile_speed: 20.0,
                pierce: 99,
                ..s
            },
            WeaponKind::Missiles => WeaponStats {
                damage: 25.0,
                fire_rate: 70.0,
                range: 500.0,
                projectile_speed: 5.0,
                spread: 0.4,
                explosion_radius: 50.0,
                homing: true,
                ..s
            },
            WeaponKind::HomingLaser => WeaponStats {
                damage: 22.0,
                fire_rate: 35.0,
                range: 550.0,
                projectile_speed: 12.0,
                projectile_count: 4,
                spread: 0.8,
                pierce: 2,
                homing: true,
                ..s
            },
            WeaponKind::Shockburst => WeaponStats {
                damage: 30.0,
                fire_rate: 50.0,
                range: 400.0,
                projectile_speed: 0.0,
                chain: 6,
                explosion_radius: 80.0,
                lifetime: 12,
                ..s
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponStats {
    pub damage: f32,
    /// Ticks between shots
    pub fire_rate: f32,
    pub range: f32,
    pub projectile_speed: f32,
    pub projectile_count: u32,
    /// Total fan angle (radians) across `projectile_count`
    pub spread: f32,
    pub pierce: u32,
    pub lifetime: u32,
    pub explosion_radius: f32,
    /// Chain hops, 0 for ordinary projectiles
    pub chain: u32,
    /// Burn damage per tick applied on hit
    pub burn: f32,
    pub homing: bool,
}

impl Default for WeaponStats {
    fn default() -> Self {
        Self {
            damage: 10.0,
            fire_rate: 30.0,
            range: 400.0,
            projectile_speed: 8.0,
            projectile_count: 1,
            spread: 0.0,
            pierce: 0,
            lifetime: 90,
            explosion_radius: 0.0,
            chain: 0,
            burn: 0.0,
            homing: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    pub kind: WeaponKind,
    pub level: u32,
    pub stats: WeaponStats,
    /// Ticks since the last shot
    pub cooldown: f32,
}

impl Weapon {
    pub fn new(kind: WeaponKind) -> Self {
        Self {
            kind,
            level: 1,
            stats: kind.base_stats(),
            cooldown: 0.0,
        }
    }

    pub fn with_level(kind: WeaponKind, level: u32) -> Self {
        let mut w = Self::new(kind);
        w.set_level(level);
        w
    }

    pub fn set_level(&mut self, level: u32) {
        self.level = level.clamp(1, MAX_WEAPON_LEVEL);
        self.stats = stats_for(self.kind, self.level);
    }

    pub fn level_up(&mut self) -> bool {
        if self.level >= MAX_WEAPON_LEVEL {
            return false;
        }
        self.set_level(self.level + 1);
        true
    }

    pub fn projectile_count(&self) -> u32 {
        self.stats.projectile_count
    }

    /// Advance the cooldown counter. On reaching the threshold it resets
    /// to zero and returns true, whether or not a target is in range.
    pub fn tick_cooldown(&mut self, fire_rate_mult: f32) -> bool {
        self.cooldown += 1.0;
        if self.cooldown >= self.stats.fire_rate * fire_rate_mult {
            self.cooldown = 0.0;
            true
        } else {
            false
        }
    }
}

fn stats_for(kind: WeaponKind, level: u32) -> WeaponStats {
    let mut s = kind.base_stats();
    let steps = level.saturating_sub(1);
    s.damage *= 1.0 + 0.25 * steps as f32;
    s.fire_rate = (s.fire_rate * 0.92f32.powi(steps as i32)).max(4.0);
    match kind {
        WeaponKind::Spread | WeaponKind::Shotgun => s.projectile_count += steps / 2,
        WeaponKind::Missiles | WeaponKind::HomingLaser => s.projectile_count += steps / 3,
        WeaponKind::Lightning | WeaponKind::Shockburst => s.chain += steps / 2,
        WeaponKind::Laser | WeaponKind::Flamethrower => s.pierce += steps / 2,
        _ => {}
    }
    s
}

/// Two weapons that combine into a third once both reach the merge level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRule {
    pub a: WeaponKind,
    pub b: WeaponKind,
    pub result: WeaponKind,
}

pub const MERGE_RULES: [MergeRule; 2] = [
    MergeRule {
        a: WeaponKind::Laser,
        b: WeaponKind::Missiles,
        result: WeaponKind::HomingLaser,
    },
    MergeRule {
        a: WeaponKind::Lightning,
        b: WeaponKind::Plasma,
        result: WeaponKind::Shockburst,
    },
];

/// Replace every qualifying pair with its merged weapon at level 1.
/// Returns the kinds produced.
pub fn apply_merges(weapons: &mut Vec<Weapon>, merge_level: u32) -> Vec<WeaponKind> {
    let mut produced = Vec::new();
    for rule in MERGE_RULES {
        if weapons.iter().any(|w| w.kind == rule.result) {
            continue;
        }
        let ready = |k: WeaponKind| {
            weapons
                .iter()
                .position(|w| w.kind == k && w.level >= merge_level)
        };
        let (Some(ia), Some(ib)) = (ready(rule.a), ready(rule.b)) else {
            continue;
        };
        // Remove the higher index first so the lower stays valid
        weapons.remove(ia.max(ib));
        weapons.remove(ia.min(ib));
        weapons.push(Weapon::new(rule.result));
        produced.push(rule.result);
        log::info!(
            "Merged {} + {} into {}",
            rule.a.label(),
            rule.b.label(),
            rule.result.label()
        );
    }
    produced
}

/// Nearest live enemy strictly inside `range`; ties go to the earlier enemy
pub fn nearest_target(enemies: &[Enemy], from: Vec2, range: f32) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    let range_sq = range * range;
    for (i, e) in enemies.iter().enumerate() {
        if !e.is_alive() {
            continue;
        }
        let d = e.pos.distance_squared(from);
        if d >= range_sq {
            continue;
        }
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}

/// Spawn this weapon's projectiles at `origin` aimed at `target`
pub fn fire(
    weapon: &Weapon,
    origin: Vec2,
    target: &Enemy,
    damage_mult: f32,
    projectiles: &mut Pool<Projectile>,
) {
    let s = &weapon.stats;
    let kind = weapon.kind.projectile_kind();
    let damage = s.damage * damage_mult;

    if s.chain > 0 {
        let (_, p) = projectiles.acquire();
        p.pos = target.pos;
        p.damage = damage;
        p.life = s.lifetime;
        p.owner = Owner::Player;
        p.kind = kind;
        p.radius = 0.0;
        p.chain = s.chain;
        p.chain_radius = CHAIN_RADIUS;
        p.explosion_radius = s.explosion_radius;
        p.target = Some(target.id);
        return;
    }

    let aim = (target.pos - origin).normalize_or(Vec2::X);
    let base_angle = aim.y.atan2(aim.x);
    let n = s.projectile_count.max(1);
    for i in 0..n {
        let offset = if n == 1 {
            0.0
        } else {
            -s.spread * 0.5 + s.spread * i as f32 / (n - 1) as f32
        };
        let angle = base_angle + offset;
        let (_, p) = projectiles.acquire();
        p.pos = origin;
        p.vel = Vec2::new(angle.cos(), angle.sin()) * s.projectile_speed;
        p.damage = damage;
        p.life = s.lifetime;
        p.owner = Owner::Player;
        p.kind = kind;
        p.radius = kind.radius();
        p.pierce = s.pierce;
        p.explosion_radius = s.explosion_radius;
        p.burn_damage = s.burn;
        p.homing = s.homing;
        p.target = s.homing.then_some(target.id);
    }
}
