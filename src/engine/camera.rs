//! Smoothed follow camera with screen shake

use glam::Vec2;

#[derive(Debug, Clone)]
pub struct Camera {
    /// World position at the center of the view
    pub pos: Vec2,
    /// Fraction of the remaining distance covered per update (0..1)
    pub smoothing: f32,
    /// Shake intensity (0..1), decays each update
    pub shake: f32,
    /// Maximum shake displacement in world units at intensity 1
    pub shake_amplitude: f32,
    ticks: u32,
}

impl Camera {
    pub fn new(pos: Vec2, smoothing: f32) -> Self {
        Self {
            pos,
            smoothing: smoothing.clamp(0.0, 1.0),
            shake: 0.0,
            shake_amplitude: 12.0,
            ticks: 0,
        }
    }

    /// Move toward `target` by the smoothing fraction and decay shake
    pub fn follow(&mut self, target: Vec2) {
        self.pos += (target - self.pos) * self.smoothing;
        self.ticks = self.ticks.wrapping_add(1);
        self.shake *= 0.9;
        if self.shake < 0.01 {
            self.shake = 0.0;
        }
    }

    /// Jump straight to `target` (session start / restart)
    pub fn snap(&mut self, target: Vec2) {
        self.pos = target;
        self.shake = 0.0;
    }

    pub fn add_shake(&mut self, amount: f32) {
        self.shake = (self.shake + amount).min(1.0);
    }

    /// Current shake displacement. Cosmetic only, so it is derived from a
    /// tick hash rather than drawing from the session RNG.
    pub fn shake_offset(&self) -> Vec2 {
        if self.shake <= 0.0 {
            return Vec2::ZERO;
        }
        let hash = self.ticks.wrapping_mul(2654435761);
        let rx = (hash % 1000) as f32 / 500.0 - 1.0;
        let ry = ((hash >> 10) % 1000) as f32 / 500.0 - 1.0;
        Vec2::new(rx, ry) * self.shake * self.shake_amplitude
    }

    /// Top-left world coordinate of a view of `view_size` centered on the camera
    pub fn view_origin(&self, view_size: Vec2) -> Vec2 {
        self.pos + self.shake_offset() - view_size * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_is_smoothed() {
        let mut cam = Camera::new(Vec2::ZERO, 0.1);
        cam.follow(Vec2::new(100.0, 0.0));
        assert!((cam.pos.x - 10.0).abs() < 1e-4);
        for _ in 0..200 {
            cam.follow(Vec2::new(100.0, 0.0));
        }
        assert!((cam.pos.x - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_shake_decays() {
        let mut cam = Camera::new(Vec2::ZERO, 0.1);
        cam.add_shake(0.8);
        cam.add_shake(0.8);
        assert_eq!(cam.shake, 1.0);
        for _ in 0..100 {
            cam.follow(Vec2::ZERO);
        }
        assert_eq!(cam.shake, 0.0);
        assert_eq!(cam.shake_offset(), Vec2::ZERO);
    }
}
