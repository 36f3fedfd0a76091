//! Contact tests used by both collision resolvers

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.w, self.h)
    }
}

/// Convex polygon in world coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Vec2>,
}

impl Polygon {
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    /// Regular n-gon approximating a circle
    pub fn regular(center: Vec2, radius: f32, sides: u32) -> Self {
        let sides = sides.max(3);
        let points = (0..sides)
            .map(|i| {
                let a = i as f32 / sides as f32 * std::f32::consts::TAU;
                center + Vec2::new(a.cos(), a.sin()) * radius
            })
            .collect();
        Self { points }
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            points: self.points.iter().map(|p| *p + offset).collect(),
        }
    }

    /// Scale about an anchor point
    pub fn scaled_about(&self, anchor: Vec2, scale: f32) -> Self {
        Self {
            points: self.points.iter().map(|p| anchor + (*p - anchor) * scale).collect(),
        }
    }

    pub fn min_x(&self) -> f32 {
        self.points.iter().map(|p| p.x).fold(f32::INFINITY, f32::min)
    }

    pub fn max_x(&self) -> f32 {
        self.points.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max)
    }

    /// Vertical span covered by the polygon along the line `x`, if any
    pub fn vertical_extent_at(&self, x: f32) -> Option<(f32, f32)> {
        let n = self.points.len();
        let mut lo = f32::INFINITY;
        let mut hi = f32::NEG_INFINITY;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            let (min_x, max_x) = (a.x.min(b.x), a.x.max(b.x));
            if x < min_x || x > max_x {
                continue;
            }
            if (b.x - a.x).abs() < f32::EPSILON {
                lo = lo.min(a.y.min(b.y));
                hi = hi.max(a.y.max(b.y));
            } else {
                let t = (x - a.x) / (b.x - a.x);
                let y = a.y + (b.y - a.y) * t;
                lo = lo.min(y);
                hi = hi.max(y);
            }
        }
        (lo <= hi).then_some((lo, hi))
    }

    /// Point containment for convex polygons of either winding
    pub fn contains(&self, p: Vec2) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let mut sign = 0.0f32;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            let cross = (b - a).perp_dot(p - a);
            if cross.abs() < f32::EPSILON {
                continue;
            }
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                return false;
            }
        }
        true
    }
}

#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) < r * r
}

/// Cheap broad-phase distance
#[inline]
pub fn manhattan(a: Vec2, b: Vec2) -> f32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = Vec2::new(
        center.x.clamp(rect.x, rect.right()),
        center.y.clamp(rect.y, rect.bottom()),
    );
    center.distance_squared(closest) < radius * radius
}

/// Closest point on segment `a..b` to `p`
pub fn closest_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-4 {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

pub fn circle_polygon_overlap(center: Vec2, radius: f32, poly: &Polygon) -> bool {
    if poly.contains(center) {
        return true;
    }
    let n = poly.points.len();
    (0..n).any(|i| {
        let a = poly.points[i];
        let b = poly.points[(i + 1) % n];
        center.distance_squared(closest_on_segment(center, a, b)) < radius * radius
    })
}

/// Hermite smoothstep of `x` between `edge0` and `edge1`
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x >= edge1 { 1.0 } else { 0.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spike() -> Polygon {
        // Floor spike: base on y=100, tip at y=50
        Polygon::new(vec![
            Vec2::new(0.0, 100.0),
            Vec2::new(20.0, 50.0),
            Vec2::new(40.0, 100.0),
        ])
    }

    #[test]
    fn test_circle_rect() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(circle_rect_overlap(Vec2::new(15.0, 5.0), 6.0, &r));
        assert!(!circle_rect_overlap(Vec2::new(15.0, 5.0), 4.0, &r));
        assert!(circle_rect_overlap(Vec2::new(5.0, 5.0), 1.0, &r));
    }

    #[test]
    fn test_circle_polygon() {
        let p = spike();
        assert!(circle_polygon_overlap(Vec2::new(20.0, 80.0), 2.0, &p));
        assert!(circle_polygon_overlap(Vec2::new(20.0, 45.0), 6.0, &p));
        assert!(!circle_polygon_overlap(Vec2::new(20.0, 30.0), 6.0, &p));
    }

    #[test]
    fn test_vertical_extent() {
        let p = spike();
        let (lo, hi) = p.vertical_extent_at(20.0).unwrap();
        assert!((lo - 50.0).abs() < 1e-4);
        assert!((hi - 100.0).abs() < 1e-4);
        assert!(p.vertical_extent_at(50.0).is_none());
    }

    #[test]
    fn test_smoothstep_bounds() {
        assert_eq!(smoothstep(0.0, 10.0, -5.0), 0.0);
        assert_eq!(smoothstep(0.0, 10.0, 50.0), 1.0);
        assert!((smoothstep(0.0, 10.0, 5.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_manhattan() {
        assert_eq!(manhattan(Vec2::new(1.0, 2.0), Vec2::new(-2.0, 6.0)), 7.0);
    }
}
