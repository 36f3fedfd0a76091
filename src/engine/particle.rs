//! Cosmetic particles shared by both games

use glam::Vec2;

use super::pool::{Pool, Poolable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticleKind {
    #[default]
    Spark,
    Trail,
    Explosion,
    Blood,
    Pickup,
}

#[derive(Debug, Clone, Default)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: [f32; 4],
    /// Remaining life, counts down from `max_life`
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
    pub kind: ParticleKind,
}

impl Poolable for Particle {}

impl Particle {
    /// Remaining life as a 0..1 fraction (drives alpha)
    pub fn life_fraction(&self) -> f32 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }
}

/// Velocity retained per tick
pub const PARTICLE_DRAG: f32 = 0.95;

/// Advance every live particle one tick and release the expired ones
pub fn advance_particles(pool: &mut Pool<Particle>) {
    pool.retain(|p| {
        p.pos += p.vel;
        p.vel *= PARTICLE_DRAG;
        p.life -= 1.0;
        p.life > 0.0
    });
}

/// Emit a radial burst. `count` should already be quality-scaled.
#[allow(clippy::too_many_arguments)]
pub fn burst(
    pool: &mut Pool<Particle>,
    origin: Vec2,
    count: usize,
    speed: f32,
    color: [f32; 4],
    life: f32,
    kind: ParticleKind,
    seed: u32,
) {
    for i in 0..count as u32 {
        // Cosmetic jitter from a hash, keeps the session RNG stream untouched
        let hash = seed.wrapping_mul(2654435761).wrapping_add(i.wrapping_mul(7919));
        let r1 = (hash % 1000) as f32 / 1000.0;
        let r2 = ((hash >> 10) % 1000) as f32 / 1000.0;
        let angle = (i as f32 / count.max(1) as f32 + r1 * 0.2) * std::f32::consts::TAU;
        let dir = Vec2::new(angle.cos(), angle.sin());
        pool.spawn(Particle {
            pos: origin,
            vel: dir * speed * (0.5 + r2),
            color,
            life: life * (0.7 + r1 * 0.6),
            max_life: life * (0.7 + r1 * 0.6),
            size: 2.0 + r2 * 3.0,
            kind,
        });
    }
}
