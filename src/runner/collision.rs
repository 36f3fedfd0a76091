//! Player vs hazard contact for the runner

use glam::Vec2;

use super::generator::Level;
use super::obstacle::Obstacle;
use crate::engine::geometry::{circle_polygon_overlap, circle_rect_overlap};

/// Exact circle test against an obstacle's current shapes
pub fn circle_hits_obstacle(center: Vec2, radius: f32, obstacle: &Obstacle, tick: u64) -> bool {
    // Broad phase on the base extent, which bounds every pose horizontally
    if center.x + radius < obstacle.min_x || center.x - radius > obstacle.max_x {
        return false;
    }
    obstacle
        .rects_at(tick)
        .any(|r| circle_rect_overlap(center, radius, &r))
        || obstacle
            .polys_at(tick)
            .any(|p| circle_polygon_overlap(center, radius, &p))
}

/// Index of the first obstacle touching the player, in insertion order
pub fn first_hit(level: &Level, center: Vec2, radius: f32, tick: u64) -> Option<usize> {
    level
        .obstacles
        .iter()
        .position(|o| circle_hits_obstacle(center, radius, o, tick))
}
