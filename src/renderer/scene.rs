//! Frame assembly: session state to pixel-space triangles
//!
//! Three layers are built per frame: the cached background grid, the
//! camera-transformed world, and screen-space overlays. Output coordinates
//! are device pixels with the origin at the top-left; the presenter maps
//! them to clip space.

use glam::Vec2;

use super::shapes;
use super::vertex::{Vertex, colors, with_alpha};
use crate::engine::camera::Camera;
use crate::engine::game_loop::Viewport;
use crate::engine::particle::Particle;
use crate::engine::pool::Pool;
use crate::engine::quality::QualityProfile;
use crate::runner::{ObstacleKind, PlayerMode, PortalKind, RunnerState, WORLD_HEIGHT};
use crate::survivor::projectile::{Owner, ProjectileKind};
use crate::survivor::{EnemyKind, SurvivorState};

/// Background grid cell size in pixels
pub const GRID_SPACING: f32 = 48.0;

/// Vertices for one frame, in draw order
#[derive(Debug, Default)]
pub struct FrameBatch {
    pub background: Vec<Vertex>,
    pub world: Vec<Vertex>,
    pub screen: Vec<Vertex>,
}

impl FrameBatch {
    pub fn clear(&mut self) {
        self.background.clear();
        self.world.clear();
        self.screen.clear();
    }

    pub fn len(&self) -> usize {
        self.background.len() + self.world.len() + self.screen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.background
            .iter()
            .chain(self.world.iter())
            .chain(self.screen.iter())
    }
}

/// Grid lines for the current viewport, rebuilt only on resize
#[derive(Debug)]
pub struct BackgroundGrid {
    size: Viewport,
    vertices: Vec<Vertex>,
    generation: u32,
}

impl BackgroundGrid {
    pub fn new(size: Viewport) -> Self {
        let mut grid = Self {
            size,
            vertices: Vec::new(),
            generation: 0,
        };
        grid.rebuild();
        grid
    }

    /// Times the cache has been built
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Regenerate if the viewport changed. Returns true when rebuilt.
    pub fn resize(&mut self, size: Viewport) -> bool {
        if size == self.size {
            return false;
        }
        self.size = size;
        self.rebuild();
        true
    }

    fn rebuild(&mut self) {
        self.vertices.clear();
        // One spare cell on each axis so scrolling never exposes an edge
        let w = self.size.width as f32 + GRID_SPACING;
        let h = self.size.height as f32 + GRID_SPACING;
        let mut x = 0.0;
        while x <= w {
            shapes::rect(&mut self.vertices, Vec2::new(x, 0.0), Vec2::new(1.0, h), colors::GRID);
            x += GRID_SPACING;
        }
        let mut y = 0.0;
        while y <= h {
            shapes::rect(&mut self.vertices, Vec2::new(0.0, y), Vec2::new(w, 1.0), colors::GRID);
            y += GRID_SPACING;
        }
        self.generation += 1;
        log::debug!(
            "Background grid rebuilt for {}x{}",
            self.size.width,
            self.size.height
        );
    }

    /// Append the grid scrolled to match `origin_px`
    fn emit(&self, out: &mut Vec<Vertex>, origin_px: Vec2) {
        let shift = -Vec2::new(
            origin_px.x.rem_euclid(GRID_SPACING),
            origin_px.y.rem_euclid(GRID_SPACING),
        );
        out.extend(self.vertices.iter().map(|v| {
            Vertex::new(v.position[0] + shift.x, v.position[1] + shift.y, v.color)
        }));
    }
}

/// World-to-pixel mapping for one frame
#[derive(Debug, Clone, Copy)]
struct View {
    origin: Vec2,
    scale: f32,
    /// Visible world extent
    extent: Vec2,
}

impl View {
    fn new(camera: &Camera, viewport: Viewport, scale: f32) -> Self {
        let extent = Vec2::new(viewport.width as f32, viewport.height as f32) / scale;
        Self {
            origin: camera.view_origin(extent),
            scale,
            extent,
        }
    }

    #[inline]
    fn px(&self, p: Vec2) -> Vec2 {
        (p - self.origin) * self.scale
    }

    fn visible(&self, p: Vec2, margin: f32) -> bool {
        let rel = p - self.origin;
        rel.x >= -margin
            && rel.y >= -margin
            && rel.x <= self.extent.x + margin
            && rel.y <= self.extent.y + margin
    }
}

pub struct FrameBuilder {
    viewport: Viewport,
    grid: BackgroundGrid,
    batch: FrameBatch,
    scratch: Vec<Vec2>,
}

impl FrameBuilder {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            grid: BackgroundGrid::new(viewport),
            batch: FrameBatch::default(),
            scratch: Vec::new(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn grid(&self) -> &BackgroundGrid {
        &self.grid
    }

    /// Track the container size; resolution-dependent caches follow it
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.grid.resize(viewport);
    }

    pub fn batch(&self) -> &FrameBatch {
        &self.batch
    }

    /// Build the runner frame: the world height fills the viewport height
    pub fn runner(&mut self, state: &RunnerState) -> &FrameBatch {
        self.batch.clear();
        if !self.viewport.is_ready() {
            return &self.batch;
        }
        let view = View::new(
            &state.camera,
            self.viewport,
            self.viewport.height as f32 / WORLD_HEIGHT,
        );
        let profile = state.quality.profile();
        self.grid.emit(&mut self.batch.background, view.origin * view.scale);

        let out = &mut self.batch.world;
        let edge_w = view.extent.x * view.scale;
        shapes::rect(out, Vec2::new(0.0, view.px(Vec2::ZERO).y - 3.0), Vec2::new(edge_w, 3.0), colors::WORLD_EDGE);
        shapes::rect(out, Vec2::new(0.0, view.px(Vec2::new(0.0, WORLD_HEIGHT)).y), Vec2::new(edge_w, 3.0), colors::WORLD_EDGE);

        let left = view.origin.x;
        let right = view.origin.x + view.extent.x;
        for portal in &state.level.portals {
            if portal.x < left - 20.0 || portal.x > right + 20.0 {
                continue;
            }
            let color = match portal.kind {
                PortalKind::Gravity(_) => colors::PORTAL_GRAVITY,
                PortalKind::Mode(_) => colors::PORTAL_MODE,
            };
            let alpha = if portal.triggered { 0.3 } else { 1.0 };
            let top = view.px(Vec2::new(portal.x - 10.0, 0.0));
            shapes::rect(
                out,
                top,
                Vec2::new(20.0, WORLD_HEIGHT) * view.scale,
                with_alpha(color, alpha),
            );
        }

        for obstacle in &state.level.obstacles {
            if obstacle.max_x < left || obstacle.min_x > right {
                continue;
            }
            let color = match obstacle.kind {
                ObstacleKind::Spike | ObstacleKind::PulsingSpike => colors::SPIKE,
                ObstacleKind::Saw => colors::SAW,
                ObstacleKind::MovingBlock => colors::MOVING_BLOCK,
                ObstacleKind::Block => colors::BLOCK,
            };
            if let Some((center, radius)) = obstacle.saw_circle() {
                let c = view.px(center);
                let r = radius * view.scale;
                if profile.glow {
                    shapes::ring(out, c, r, r * (1.0 + 0.3 * profile.shadow_blur), with_alpha(color, 0.3), 24);
                }
                shapes::circle(out, c, r, color, shapes::segments_for(r));
                continue;
            }
            for r in obstacle.rects_at(state.ticks) {
                shapes::rect(
                    out,
                    view.px(Vec2::new(r.x, r.y)),
                    Vec2::new(r.w, r.h) * view.scale,
                    color,
                );
            }
            for poly in obstacle.polys_at(state.ticks) {
                self.scratch.clear();
                self.scratch.extend(poly.points.iter().map(|p| view.px(*p)));
                shapes::polygon(out, &self.scratch, color);
            }
        }

        emit_particles(out, &state.particles, &view);

        let player = &state.player;
        if !player.trail.is_empty() {
            let trail: std::collections::VecDeque<Vec2> =
                player.trail.iter().map(|p| view.px(*p)).collect();
            shapes::trail(out, &trail, player.radius * view.scale * 0.8, colors::RUNNER_PLAYER);
        }
        // Blink while invulnerable
        if !player.is_invulnerable() || (state.ticks / 6) % 2 == 0 {
            let c = view.px(player.pos);
            let r = player.radius * view.scale;
            if profile.glow {
                shapes::circle(out, c, r * 1.6, with_alpha(colors::RUNNER_PLAYER, 0.2 * profile.effects), 24);
            }
            match player.mode {
                PlayerMode::Ship => shapes::circle(out, c, r, colors::RUNNER_PLAYER, 24),
                PlayerMode::Cube => shapes::rect(out, c - Vec2::splat(r), Vec2::splat(r * 2.0), colors::RUNNER_PLAYER),
            }
        }

        let screen = &mut self.batch.screen;
        for i in 0..player.max_health {
            let color = if i < player.health {
                colors::HEALTH_FILL
            } else {
                colors::HEALTH_BACK
            };
            shapes::rect(screen, Vec2::new(16.0 + i as f32 * 22.0, 16.0), Vec2::splat(16.0), color);
        }
        emit_flash(screen, self.viewport, state.flash, &profile);
        &self.batch
    }

    /// Build the survivor frame: one world unit per pixel, player centered
    pub fn survivor(&mut self, state: &SurvivorState) -> &FrameBatch {
        self.batch.clear();
        if !self.viewport.is_ready() {
            return &self.batch;
        }
        let view = View::new(&state.camera, self.viewport, 1.0);
        let profile = state.quality.profile();
        self.grid.emit(&mut self.batch.background, view.origin);

        let out = &mut self.batch.world;
        for (_, orb) in state.orbs.iter() {
            if view.visible(orb.pos, 10.0) {
                shapes::circle(out, view.px(orb.pos), 4.0, colors::XP_ORB, 8);
            }
        }

        for e in &state.enemies {
            if !view.visible(e.pos, e.radius) {
                continue;
            }
            let base = match e.kind {
                EnemyKind::Chase => colors::CHASE,
                EnemyKind::Dodge => colors::DODGE,
                EnemyKind::Tank => colors::TANK,
                EnemyKind::Fly => colors::FLY,
                EnemyKind::Teleport => colors::TELEPORT,
                EnemyKind::Boss => colors::BOSS,
            };
            let f = e.hit_flash.clamp(0.0, 1.0);
            let color = [
                base[0] + (1.0 - base[0]) * f,
                base[1] + (1.0 - base[1]) * f,
                base[2] + (1.0 - base[2]) * f,
                base[3],
            ];
            let c = view.px(e.pos);
            if e.is_boss() && profile.glow {
                shapes::ring(out, c, e.radius, e.radius * (1.0 + 0.25 * profile.shadow_blur) + 4.0, with_alpha(base, 0.4), 32);
            }
            shapes::circle(out, c, e.radius, color, shapes::segments_for(e.radius));
            if e.burn_ticks > 0 {
                shapes::ring(out, c, e.radius, e.radius + 2.0, colors::EXPLOSION, 12);
            }
        }

        for (_, p) in state.projectiles.iter() {
            if p.kind == ProjectileKind::Chain {
                let alpha = (p.life as f32 / 12.0).clamp(0.0, 1.0);
                for pair in p.chain_points.windows(2) {
                    shapes::line(out, view.px(pair[0]), view.px(pair[1]), 3.0, with_alpha(colors::LIGHTNING, alpha));
                }
                continue;
            }
            if !view.visible(p.pos, p.radius) {
                continue;
            }
            let color = match p.owner {
                Owner::Player => colors::PLAYER_SHOT,
                Owner::Enemy => colors::ENEMY_SHOT,
            };
            let c = view.px(p.pos);
            match p.kind {
                ProjectileKind::Laser | ProjectileKind::HomingLaser | ProjectileKind::Rail => {
                    let tail = c - p.vel.normalize_or_zero() * p.radius * 4.0;
                    shapes::line(out, tail, c, p.radius * 1.5, color);
                }
                _ => shapes::circle(out, c, p.radius, color, 8),
            }
        }

        for (_, e) in state.explosions.iter() {
            let t = e.progress();
            let r = e.radius * (0.3 + 0.7 * t);
            shapes::ring(out, view.px(e.pos), r * 0.8, r, with_alpha(colors::EXPLOSION, 1.0 - t), 24);
        }

        emit_particles(out, &state.particles, &view);

        let player = &state.player;
        if !player.trail.is_empty() {
            let trail: std::collections::VecDeque<Vec2> =
                player.trail.iter().map(|p| view.px(*p)).collect();
            shapes::trail(out, &trail, player.radius * 0.7, colors::SURVIVOR_PLAYER);
        }
        if player.invulnerable == 0 || (state.ticks / 6) % 2 == 0 {
            let c = view.px(player.pos);
            if profile.glow {
                shapes::circle(out, c, player.radius * 1.6, with_alpha(colors::SURVIVOR_PLAYER, 0.2 * profile.effects), 24);
            }
            shapes::circle(out, c, player.radius, colors::SURVIVOR_PLAYER, 24);
        }

        let screen = &mut self.batch.screen;
        let width = self.viewport.width as f32;
        if let Some(boss) = state.boss() {
            let bar = Vec2::new(width * 0.6, 12.0);
            let at = Vec2::new((width - bar.x) * 0.5, 20.0);
            shapes::rect(screen, at, bar, colors::HEALTH_BACK);
            shapes::rect(screen, at, Vec2::new(bar.x * boss.health_fraction(), bar.y), colors::BOSS);
        }
        emit_flash(screen, self.viewport, state.damage_flash, &profile);
        if !state.pending_choices.is_empty() {
            shapes::rect(
                screen,
                Vec2::ZERO,
                Vec2::new(width, self.viewport.height as f32),
                colors::DIM,
            );
        }
        &self.batch
    }
}

fn emit_particles(out: &mut Vec<Vertex>, particles: &Pool<Particle>, view: &View) {
    for (_, p) in particles.iter() {
        if !view.visible(p.pos, p.size) {
            continue;
        }
        let color = with_alpha(p.color, p.life_fraction());
        shapes::circle(out, view.px(p.pos), p.size * view.scale, color, 6);
    }
}

/// Full-screen red wash, scaled by the effects multiplier
fn emit_flash(out: &mut Vec<Vertex>, viewport: Viewport, intensity: f32, profile: &QualityProfile) {
    if intensity <= 0.0 {
        return;
    }
    let alpha = 0.35 * intensity * profile.effects.max(0.5);
    shapes::rect(
        out,
        Vec2::ZERO,
        Vec2::new(viewport.width as f32, viewport.height as f32),
        with_alpha(colors::FLASH, alpha),
    );
}
