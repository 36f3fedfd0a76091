//! Triangle-list generation for 2D primitives
//!
//! Every builder appends to an existing vertex list so a frame reuses one
//! allocation.

use std::collections::VecDeque;
use std::f32::consts::TAU;

use glam::Vec2;

use super::vertex::Vertex;

#[inline]
fn tri(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) {
    out.push(Vertex::new(a.x, a.y, color));
    out.push(Vertex::new(b.x, b.y, color));
    out.push(Vertex::new(c.x, c.y, color));
}

/// Segment count that keeps edges smooth without wasting triangles on tiny circles
pub fn segments_for(radius: f32) -> u32 {
    ((radius * 0.8) as u32).clamp(8, 48)
}

/// Filled circle
pub fn circle(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: [f32; 4], segments: u32) {
    let segments = segments.max(3);
    out.reserve(segments as usize * 3);
    for i in 0..segments {
        let theta1 = i as f32 / segments as f32 * TAU;
        let theta2 = (i + 1) as f32 / segments as f32 * TAU;
        tri(
            out,
            center,
            center + Vec2::new(theta1.cos(), theta1.sin()) * radius,
            center + Vec2::new(theta2.cos(), theta2.sin()) * radius,
            color,
        );
    }
}

/// Hollow circle
pub fn ring(
    out: &mut Vec<Vertex>,
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) {
    let segments = segments.max(3);
    out.reserve(segments as usize * 6);
    for i in 0..segments {
        let theta1 = i as f32 / segments as f32 * TAU;
        let theta2 = (i + 1) as f32 / segments as f32 * TAU;
        let d1 = Vec2::new(theta1.cos(), theta1.sin());
        let d2 = Vec2::new(theta2.cos(), theta2.sin());
        let inner1 = center + d1 * inner_radius;
        let outer1 = center + d1 * outer_radius;
        let inner2 = center + d2 * inner_radius;
        let outer2 = center + d2 * outer_radius;
        tri(out, inner1, outer1, inner2, color);
        tri(out, inner2, outer1, outer2, color);
    }
}

/// Axis-aligned rectangle from its top-left corner
pub fn rect(out: &mut Vec<Vertex>, min: Vec2, size: Vec2, color: [f32; 4]) {
    let max = min + size;
    let tr = Vec2::new(max.x, min.y);
    let bl = Vec2::new(min.x, max.y);
    tri(out, min, tr, bl, color);
    tri(out, bl, tr, max, color);
}

/// Convex polygon as a triangle fan
pub fn polygon(out: &mut Vec<Vertex>, points: &[Vec2], color: [f32; 4]) {
    if points.len() < 3 {
        return;
    }
    let first = points[0];
    for pair in points[1..].windows(2) {
        tri(out, first, pair[0], pair[1], color);
    }
}

/// Thick line segment
pub fn line(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, width: f32, color: [f32; 4]) {
    let dir = (b - a).normalize_or_zero();
    if dir == Vec2::ZERO {
        return;
    }
    let perp = dir.perp() * (width * 0.5);
    tri(out, a + perp, a - perp, b + perp, color);
    tri(out, b + perp, a - perp, b - perp, color);
}

/// Tapered, fading strip through recent positions (newest first)
pub fn trail(out: &mut Vec<Vertex>, points: &VecDeque<Vec2>, width: f32, color: [f32; 4]) {
    if points.len() < 2 {
        return;
    }
    let len = points.len() as f32;
    out.reserve(points.len() * 6);
    for (i, (p1, p2)) in points.iter().zip(points.iter().skip(1)).enumerate() {
        // Fade alpha and width along the trail
        let t1 = i as f32 / len;
        let t2 = (i + 1) as f32 / len;
        let c1 = [color[0], color[1], color[2], color[3] * (1.0 - t1) * 0.8];
        let c2 = [color[0], color[1], color[2], color[3] * (1.0 - t2) * 0.8];
        let w1 = width * (1.0 - t1 * 0.7);
        let w2 = width * (1.0 - t2 * 0.7);

        let perp = (*p2 - *p1).normalize_or_zero().perp();
        let v1a = *p1 + perp * w1;
        let v1b = *p1 - perp * w1;
        let v2a = *p2 + perp * w2;
        let v2b = *p2 - perp * w2;

        out.push(Vertex::new(v1a.x, v1a.y, c1));
        out.push(Vertex::new(v1b.x, v1b.y, c1));
        out.push(Vertex::new(v2a.x, v2a.y, c2));

        out.push(Vertex::new(v2a.x, v2a.y, c2));
        out.push(Vertex::new(v1b.x, v1b.y, c1));
        out.push(Vertex::new(v2b.x, v2b.y, c2));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_counts() {
        let mut out = Vec::new();
        circle(&mut out, Vec2::ZERO, 10.0, [1.0; 4], 12);
        assert_eq!(out.len(), 36);
        out.clear();
        ring(&mut out, Vec2::ZERO, 8.0, 10.0, [1.0; 4], 12);
        assert_eq!(out.len(), 72);
        out.clear();
        polygon(
            &mut out,
            &[Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y],
            [1.0; 4],
        );
        assert_eq!(out.len(), 6);
    }

    #[test]
    fn test_degenerate_inputs_emit_nothing() {
        let mut out = Vec::new();
        polygon(&mut out, &[Vec2::ZERO, Vec2::X], [1.0; 4]);
        line(&mut out, Vec2::ONE, Vec2::ONE, 2.0, [1.0; 4]);
        trail(&mut out, &VecDeque::from([Vec2::ZERO]), 4.0, [1.0; 4]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_trail_fades() {
        let mut out = Vec::new();
        let points = VecDeque::from([Vec2::new(10.0, 0.0), Vec2::new(5.0, 0.0), Vec2::ZERO]);
        trail(&mut out, &points, 4.0, [1.0; 4]);
        assert_eq!(out.len(), 12);
        assert!(out[0].color[3] > out[11].color[3]);
    }
}
