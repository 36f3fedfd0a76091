//! Corridor clearance checks
//!
//! A column at `x` is passable when some vertical gap between the merged
//! hazard spans (and the world bounds) is at least the player's diameter
//! plus a safety margin. Motion envelopes are used, so a column that passes
//! is passable at every tick.

use super::WORLD_HEIGHT;
use super::obstacle::Obstacle;

/// Gap height the player needs to get through
pub fn required_clearance(player_radius: f32, margin: f32) -> f32 {
    player_radius * 2.0 + margin
}

/// Hazard spans covering the column at `x`, unmerged
pub fn blocked_spans<'a>(obstacles: impl IntoIterator<Item = &'a Obstacle>, x: f32) -> Vec<(f32, f32)> {
    let mut spans = Vec::new();
    for o in obstacles {
        o.blocked_spans_at(x, &mut spans);
    }
    spans
}

/// Free vertical intervals in `[0, WORLD_HEIGHT]` left by `spans`
pub fn free_gaps(mut spans: Vec<(f32, f32)>) -> Vec<(f32, f32)> {
    spans.retain(|(lo, hi)| hi > lo);
    spans.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut gaps = Vec::new();
    let mut cursor = 0.0f32;
    for (lo, hi) in spans {
        if lo > cursor {
            gaps.push((cursor, lo.min(WORLD_HEIGHT)));
        }
        cursor = cursor.max(hi);
        if cursor >= WORLD_HEIGHT {
            break;
        }
    }
    if cursor < WORLD_HEIGHT {
        gaps.push((cursor, WORLD_HEIGHT));
    }
    gaps.retain(|(lo, hi)| hi > lo);
    gaps
}

/// Largest free gap at `x`
pub fn max_clearance<'a>(obstacles: impl IntoIterator<Item = &'a Obstacle>, x: f32) -> f32 {
    free_gaps(blocked_spans(obstacles, x))
        .into_iter()
        .map(|(lo, hi)| hi - lo)
        .fold(0.0, f32::max)
}

/// Sample columns across `[start, end]` at `step` plus every obstacle edge,
/// returning the first column that is too narrow
pub fn first_blocked_column(
    obstacles: &[Obstacle],
    start: f32,
    end: f32,
    step: f32,
    required: f32,
) -> Option<f32> {
    let mut columns: Vec<f32> = Vec::new();
    let mut x = start;
    while x <= end {
        columns.push(x);
        x += step.max(1.0);
    }
    for o in obstacles {
        for edge in [o.min_x, o.max_x] {
            if edge >= start && edge <= end {
                columns.push(edge);
            }
        }
    }
    columns
        .into_iter()
        .find(|&x| max_clearance(obstacles.iter(), x) < required)
}
