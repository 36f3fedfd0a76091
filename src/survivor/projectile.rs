//! Pooled transient survivor entities: projectiles, explosions, XP orbs

use glam::Vec2;

use super::enemy::Enemy;
use crate::engine::pool::{Pool, Poolable};

/// Projectiles further than this from the player are dropped
pub const DESPAWN_DISTANCE: f32 = 1_500.0;
/// Range a homing projectile searches when its target dies
pub const HOMING_REACQUIRE_RANGE: f32 = 600.0;
pub const ORB_RADIUS: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Owner {
    #[default]
    Player,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectileKind {
    #[default]
    Bullet,
    Laser,
    Plasma,
    Pellet,
    Flame,
    Rail,
    Missile,
    HomingLaser,
    /// Stationary; resolves its hops once, then lingers for rendering
    Chain,
    BossMissile,
}

impl ProjectileKind {
    pub fn radius(self) -> f32 {
        match self {
            ProjectileKind::Bullet | ProjectileKind::Pellet => 4.0,
            ProjectileKind::Laser | ProjectileKind::HomingLaser => 3.0,
            ProjectileKind::Plasma => 8.0,
            ProjectileKind::Flame => 10.0,
            ProjectileKind::Rail => 5.0,
            ProjectileKind::Missile | ProjectileKind::BossMissile => 6.0,
            ProjectileKind::Chain => 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    /// Ticks remaining
    pub life: u32,
    pub owner: Owner,
    pub kind: ProjectileKind,
    pub radius: f32,
    /// Extra enemies it may pass through
    pub pierce: u32,
    pub explosion_radius: f32,
    pub burn_damage: f32,
    pub homing: bool,
    /// Enemy id being tracked (homing) or first hop (chain)
    pub target: Option<u32>,
    pub chain: u32,
    pub chain_radius: f32,
    pub chain_resolved: bool,
    /// Hop positions, kept for drawing the bolt
    pub chain_points: Vec<Vec2>,
    /// Enemy ids already hit, so a piercing shot damages each once
    pub hits: Vec<u32>,
}

impl Poolable for Projectile {
    fn reset(&mut self) {
        // Keep the vector allocations across reuse
        let mut chain_points = std::mem::take(&mut self.chain_points);
        let mut hits = std::mem::take(&mut self.hits);
        chain_points.clear();
        hits.clear();
        *self = Self {
            chain_points,
            hits,
            ..Default::default()
        };
    }
}

/// Turn rate toward a tracked target, per tick
const PLAYER_HOMING_TURN: f32 = 0.12;
const BOSS_MISSILE_TURN: f32 = 0.03;

/// Move every projectile one tick. Homing shots re-acquire the nearest
/// live enemy when their target is gone. Expired shots are released.
pub fn advance_projectiles(pool: &mut Pool<Projectile>, enemies: &[Enemy], player_pos: Vec2) {
    pool.retain(|p| {
        if p.life == 0 {
            return false;
        }
        p.life -= 1;
        if p.kind == ProjectileKind::Chain {
            return p.life > 0;
        }

        match p.owner {
            Owner::Player if p.homing => {
                let tracked = p
                    .target
                    .and_then(|id| enemies.iter().find(|e| e.id == id && e.is_alive()));
                let target = match tracked {
                    Some(e) => Some(e),
                    None => {
                        let found = super::weapon::nearest_target(enemies, p.pos, HOMING_REACQUIRE_RANGE)
                            .map(|i| &enemies[i]);
                        p.target = found.map(|e| e.id);
                        found
                    }
                };
                if let Some(t) = target {
                    steer(p, t.pos, PLAYER_HOMING_TURN);
                }
            }
            Owner::Enemy if p.homing => steer(p, player_pos, BOSS_MISSILE_TURN),
            _ => {}
        }

        p.pos += p.vel;
        p.life > 0 && p.pos.distance_squared(player_pos) < DESPAWN_DISTANCE * DESPAWN_DISTANCE
    });
}

fn steer(p: &mut Projectile, toward: Vec2, turn: f32) {
    let speed = p.vel.length();
    if speed <= f32::EPSILON {
        return;
    }
    let desired = (toward - p.pos).normalize_or_zero() * speed;
    p.vel = p.vel.lerp(desired, turn).normalize_or_zero() * speed;
}

/// Expanding blast ring, visual only (damage is applied on creation)
#[derive(Debug, Clone, Default)]
pub struct Explosion {
    pub pos: Vec2,
    pub radius: f32,
    pub life: f32,
    pub max_life: f32,
}

impl Poolable for Explosion {}

impl Explosion {
    /// 0 at spawn, 1 when finished
    pub fn progress(&self) -> f32 {
        if self.max_life <= 0.0 {
            1.0
        } else {
            1.0 - (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }
}

pub fn advance_explosions(pool: &mut Pool<Explosion>) {
    pool.retain(|e| {
        e.life -= 1.0;
        e.life > 0.0
    });
}

#[derive(Debug, Clone, Default)]
pub struct XpOrb {
    pub pos: Vec2,
    pub value: f32,
    pub life: u32,
}

impl Poolable for XpOrb {}

/// Pull orbs inside `magnet_radius` toward the player and collect the ones
/// touching it. Returns the experience collected.
pub fn advance_orbs(
    pool: &mut Pool<XpOrb>,
    player_pos: Vec2,
    player_radius: f32,
    magnet_radius: f32,
    magnet_speed: f32,
) -> f32 {
    let mut collected = 0.0;
    pool.retain(|orb| {
        orb.life = orb.life.saturating_sub(1);
        let to_player = player_pos - orb.pos;
        let dist = to_player.length();
        if dist < magnet_radius {
            orb.pos += to_player.normalize_or_zero() * magnet_speed.min(dist);
        }
        if orb.pos.distance(player_pos) < player_radius + ORB_RADIUS {
            collected += orb.value;
            return false;
        }
        orb.life > 0
    });
    collected
}
