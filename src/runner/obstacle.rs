//! Runner obstacles and trigger portals

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::WORLD_HEIGHT;
use crate::engine::geometry::{Polygon, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Spike,
    Saw,
    MovingBlock,
    PulsingSpike,
    Block,
}

/// Which surface a spike grows from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Top,
    Bottom,
}

/// Time-varying transform applied to an obstacle's base shapes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    Static,
    /// Vertical sine offset of `amplitude` world units
    Oscillate {
        amplitude: f32,
        speed: f32,
        phase: f32,
    },
    /// Scale between `min_scale` and 1 about `anchor`. The base shape is the largest extent.
    Pulse {
        min_scale: f32,
        speed: f32,
        phase: f32,
        anchor: Vec2,
    },
}

/// A hazard made of rectangles and/or convex polygons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub rects: Vec<Rect>,
    pub polys: Vec<Polygon>,
    pub motion: Motion,
    /// Orientation, kept for rendering and tests
    pub side: Option<Side>,
    /// Horizontal extent of the base shapes
    pub min_x: f32,
    pub max_x: f32,
}

impl Obstacle {
    fn from_parts(
        kind: ObstacleKind,
        rects: Vec<Rect>,
        polys: Vec<Polygon>,
        motion: Motion,
        side: Option<Side>,
    ) -> Self {
        let min_x = rects
            .iter()
            .map(|r| r.x)
            .chain(polys.iter().map(|p| p.min_x()))
            .fold(f32::INFINITY, f32::min);
        let max_x = rects
            .iter()
            .map(|r| r.right())
            .chain(polys.iter().map(|p| p.max_x()))
            .fold(f32::NEG_INFINITY, f32::max);
        Self {
            kind,
            rects,
            polys,
            motion,
            side,
            min_x,
            max_x,
        }
    }

    /// Triangle spike with its base on the ceiling or floor
    pub fn spike(x: f32, width: f32, height: f32, side: Side) -> Self {
        Self::from_parts(
            ObstacleKind::Spike,
            Vec::new(),
            vec![spike_polygon(x, width, height, side)],
            Motion::Static,
            Some(side),
        )
    }

    /// Spike growing from an arbitrary surface line `base_y`
    pub fn spike_at(x: f32, base_y: f32, width: f32, height: f32, side: Side) -> Self {
        let tip_y = match side {
            Side::Top => base_y + height,
            Side::Bottom => base_y - height,
        };
        let poly = Polygon::new(vec![
            Vec2::new(x, base_y),
            Vec2::new(x + width * 0.5, tip_y),
            Vec2::new(x + width, base_y),
        ]);
        Self::from_parts(ObstacleKind::Spike, Vec::new(), vec![poly], Motion::Static, Some(side))
    }

    pub fn pulsing_spike(x: f32, width: f32, height: f32, side: Side, speed: f32, phase: f32) -> Self {
        let anchor = match side {
            Side::Top => Vec2::new(x + width * 0.5, 0.0),
            Side::Bottom => Vec2::new(x + width * 0.5, WORLD_HEIGHT),
        };
        Self::from_parts(
            ObstacleKind::PulsingSpike,
            Vec::new(),
            vec![spike_polygon(x, width, height, side)],
            Motion::Pulse {
                min_scale: 0.4,
                speed,
                phase,
                anchor,
            },
            Some(side),
        )
    }

    /// Circular saw, approximated by a 12-gon
    pub fn saw(center: Vec2, radius: f32) -> Self {
        Self::from_parts(
            ObstacleKind::Saw,
            Vec::new(),
            vec![Polygon::regular(center, radius, 12)],
            Motion::Static,
            None,
        )
    }

    pub fn block(rect: Rect) -> Self {
        Self::from_parts(ObstacleKind::Block, vec![rect], Vec::new(), Motion::Static, None)
    }

    pub fn moving_block(rect: Rect, amplitude: f32, speed: f32, phase: f32) -> Self {
        Self::from_parts(
            ObstacleKind::MovingBlock,
            vec![rect],
            Vec::new(),
            Motion::Oscillate {
                amplitude,
                speed,
                phase,
            },
            None,
        )
    }

    /// Saw center and radius, for rendering
    pub fn saw_circle(&self) -> Option<(Vec2, f32)> {
        if self.kind != ObstacleKind::Saw {
            return None;
        }
        let poly = self.polys.first()?;
        let n = poly.points.len().max(1) as f32;
        let center = poly.points.iter().copied().sum::<Vec2>() / n;
        Some((center, poly.points[0].distance(center)))
    }

    /// Vertical displacement at `tick` (0 for non-oscillating obstacles)
    pub fn offset_at(&self, tick: u64) -> f32 {
        match self.motion {
            Motion::Oscillate {
                amplitude,
                speed,
                phase,
            } => amplitude * (tick as f32 * speed + phase).sin(),
            _ => 0.0,
        }
    }

    /// Scale factor at `tick` (1 for non-pulsing obstacles)
    pub fn scale_at(&self, tick: u64) -> f32 {
        match self.motion {
            Motion::Pulse {
                min_scale,
                speed,
                phase,
                ..
            } => {
                let t = 0.5 + 0.5 * (tick as f32 * speed + phase).sin();
                min_scale + (1.0 - min_scale) * t
            }
            _ => 1.0,
        }
    }

    /// Rectangles as positioned at `tick`
    pub fn rects_at(&self, tick: u64) -> impl Iterator<Item = Rect> + '_ {
        let offset = Vec2::new(0.0, self.offset_at(tick));
        self.rects.iter().map(move |r| r.translated(offset))
    }

    /// Polygons as positioned and scaled at `tick`
    pub fn polys_at(&self, tick: u64) -> impl Iterator<Item = Polygon> + '_ {
        let offset = Vec2::new(0.0, self.offset_at(tick));
        let scale = self.scale_at(tick);
        let anchor = match self.motion {
            Motion::Pulse { anchor, .. } => Some(anchor),
            _ => None,
        };
        self.polys.iter().map(move |p| match anchor {
            Some(anchor) => p.scaled_about(anchor, scale),
            None => p.translated(offset),
        })
    }

    /// Vertical half-range the shapes can move through
    pub fn sweep(&self) -> f32 {
        match self.motion {
            Motion::Oscillate { amplitude, .. } => amplitude.abs(),
            _ => 0.0,
        }
    }

    /// Vertical spans this obstacle can ever cover along the line `x`,
    /// including its full range of motion
    pub fn blocked_spans_at(&self, x: f32, out: &mut Vec<(f32, f32)>) {
        if x < self.min_x || x > self.max_x {
            return;
        }
        let sweep = self.sweep();
        for r in &self.rects {
            if x >= r.x && x <= r.right() {
                out.push((r.y - sweep, r.bottom() + sweep));
            }
        }
        for p in &self.polys {
            if let Some((lo, hi)) = p.vertical_extent_at(x) {
                out.push((lo - sweep, hi + sweep));
            }
        }
    }
}

fn spike_polygon(x: f32, width: f32, height: f32, side: Side) -> Polygon {
    let (base_y, tip_y) = match side {
        Side::Top => (0.0, height),
        Side::Bottom => (WORLD_HEIGHT, WORLD_HEIGHT - height),
    };
    Polygon::new(vec![
        Vec2::new(x, base_y),
        Vec2::new(x + width * 0.5, tip_y),
        Vec2::new(x + width, base_y),
    ])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GravityDir {
    Down,
    Up,
}

impl GravityDir {
    /// +1 pulls toward the floor, -1 toward the ceiling
    pub fn sign(self) -> f32 {
        match self {
            GravityDir::Down => 1.0,
            GravityDir::Up => -1.0,
        }
    }
}

/// Player movement model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerMode {
    /// Hold to thrust against gravity
    Ship,
    /// Press while grounded to jump
    Cube,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortalKind {
    Gravity(GravityDir),
    Mode(PlayerMode),
}

/// Non-hazard trigger crossed by the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Portal {
    pub x: f32,
    pub kind: PortalKind,
    pub triggered: bool,
}

impl Portal {
    pub fn new(x: f32, kind: PortalKind) -> Self {
        Self {
            x,
            kind,
            triggered: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spike_orientation() {
        let top = Obstacle::spike(0.0, 40.0, 50.0, Side::Top);
        let mut spans = Vec::new();
        top.blocked_spans_at(20.0, &mut spans);
        assert_eq!(spans.len(), 1);
        assert!((spans[0].0 - 0.0).abs() < 1e-4 && (spans[0].1 - 50.0).abs() < 1e-4);

        let bottom = Obstacle::spike(0.0, 40.0, 50.0, Side::Bottom);
        spans.clear();
        bottom.blocked_spans_at(20.0, &mut spans);
        assert!((spans[0].0 - (WORLD_HEIGHT - 50.0)).abs() < 1e-4);
    }

    #[test]
    fn test_moving_block_envelope_covers_motion() {
        let block = Obstacle::moving_block(Rect::new(0.0, 200.0, 50.0, 100.0), 60.0, 0.05, 0.0);
        let mut spans = Vec::new();
        block.blocked_spans_at(25.0, &mut spans);
        assert_eq!(spans, vec![(140.0, 360.0)]);
        for tick in 0..200 {
            let r = block.rects_at(tick).next().unwrap();
            assert!(r.y >= 140.0 - 1e-3 && r.bottom() <= 360.0 + 1e-3);
        }
    }

    #[test]
    fn test_pulse_stays_within_base() {
        let spike = Obstacle::pulsing_spike(0.0, 40.0, 70.0, Side::Bottom, 0.1, 0.0);
        for tick in 0..100 {
            let s = spike.scale_at(tick);
            assert!((0.4..=1.0).contains(&s));
            let poly = spike.polys_at(tick).next().unwrap();
            let (lo, _) = poly.vertical_extent_at(20.0).unwrap();
            assert!(lo >= WORLD_HEIGHT - 70.0 - 1e-3);
        }
    }
}
