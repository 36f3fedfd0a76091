//! Adaptive quality scaling
//!
//! Samples frame durations into a rolling window and, every check interval,
//! steps cosmetic multipliers down when the average FPS is below the low
//! threshold or up when it is above the high threshold. Adjustments are rate
//! limited by a cooldown. Only cosmetic density and effect fidelity are
//! affected; simulation is never throttled here.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::tuning::QualityTuning;

/// Highest quality tier
pub const MAX_TIER: u8 = 5;

/// Named quality tier with its multipliers, read by rendering and entity spawning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityProfile {
    /// 1 (lowest) ..= 5 (highest)
    pub tier: u8,
    pub particles: f32,
    pub shadow_blur: f32,
    pub trail: f32,
    pub effects: f32,
    pub glow: bool,
}

impl QualityProfile {
    /// Preset multipliers for a tier
    pub fn for_tier(tier: u8) -> Self {
        let tier = tier.clamp(1, MAX_TIER);
        let (particles, shadow_blur, trail, effects) = match tier {
            1 => (0.2, 0.0, 0.25, 0.3),
            2 => (0.4, 0.25, 0.4, 0.5),
            3 => (0.6, 0.5, 0.6, 0.7),
            4 => (0.8, 0.75, 0.8, 0.85),
            _ => (1.0, 1.0, 1.0, 1.0),
        };
        Self {
            tier,
            particles,
            shadow_blur,
            trail,
            effects,
            glow: effects >= 0.5,
        }
    }

    /// Scale a base particle count, keeping at least one when the base is nonzero
    pub fn particle_count(&self, base: usize) -> usize {
        if base == 0 {
            return 0;
        }
        ((base as f32 * self.particles).round() as usize).max(1)
    }

    /// Scale a base trail length
    pub fn trail_length(&self, base: usize) -> usize {
        ((base as f32 * self.trail).round() as usize).max(2)
    }
}

impl Default for QualityProfile {
    fn default() -> Self {
        Self::for_tier(MAX_TIER)
    }
}

/// Direction of a quality adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityChange {
    Lowered,
    Raised,
}

/// Frame-rate driven quality controller
#[derive(Debug, Clone)]
pub struct QualityController {
    tuning: QualityTuning,
    enabled: bool,
    samples: VecDeque<f64>,
    ticks_since_check: u32,
    last_adjust_ms: Option<f64>,
    profile: QualityProfile,
}

impl QualityController {
    pub fn new(tuning: QualityTuning, initial_tier: u8) -> Self {
        Self {
            samples: VecDeque::with_capacity(tuning.window),
            tuning,
            enabled: true,
            ticks_since_check: 0,
            last_adjust_ms: None,
            profile: QualityProfile::for_tier(initial_tier),
        }
    }

    /// Disable automatic adjustment (the profile stays where it is)
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn profile(&self) -> QualityProfile {
        self.profile
    }

    /// Force a tier (e.g. from the settings menu)
    pub fn set_tier(&mut self, tier: u8) {
        self.profile = QualityProfile::for_tier(tier);
    }

    /// Average FPS across the current window
    pub fn average_fps(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let avg_ms = self.samples.iter().sum::<f64>() / self.samples.len() as f64;
        if avg_ms <= 0.0 { 0.0 } else { (1000.0 / avg_ms) as f32 }
    }

    /// Record a frame duration (ms) at time `now_ms`. Returns the adjustment made, if any.
    pub fn sample(&mut self, frame_ms: f64, now_ms: f64) -> Option<QualityChange> {
        if !frame_ms.is_finite() || frame_ms <= 0.0 {
            return None;
        }
        self.samples.push_back(frame_ms);
        while self.samples.len() > self.tuning.window.max(1) {
            self.samples.pop_front();
        }

        self.ticks_since_check += 1;
        if self.ticks_since_check < self.tuning.check_interval.max(1) {
            return None;
        }
        self.ticks_since_check = 0;

        if !self.enabled {
            return None;
        }
        if let Some(last) = self.last_adjust_ms {
            if now_ms - last < self.tuning.cooldown_ms {
                return None;
            }
        }

        let fps = self.average_fps();
        let change = if fps < self.tuning.low_fps {
            self.step_multipliers(-self.tuning.step).then_some(QualityChange::Lowered)
        } else if fps > self.tuning.high_fps {
            self.step_multipliers(self.tuning.step).then_some(QualityChange::Raised)
        } else {
            None
        };

        if let Some(change) = change {
            self.last_adjust_ms = Some(now_ms);
            log::info!(
                "Quality {:?} to tier {} at {:.1} FPS",
                change,
                self.profile.tier,
                fps
            );
        }
        change
    }

    /// Move every multiplier by `delta`, clamped to [floor, 1.0]. Returns true if anything moved.
    fn step_multipliers(&mut self, delta: f32) -> bool {
        let t = &self.tuning;
        let p = &mut self.profile;
        let before = (p.particles, p.shadow_blur, p.trail, p.effects);

        p.particles = (p.particles + delta).clamp(t.particle_floor, 1.0);
        p.shadow_blur = (p.shadow_blur + delta).clamp(t.shadow_floor, 1.0);
        p.trail = (p.trail + delta).clamp(t.trail_floor, 1.0);
        p.effects = (p.effects + delta).clamp(t.effect_floor, 1.0);
        p.glow = p.effects >= 0.5;

        let mean = (p.particles + p.shadow_blur + p.trail + p.effects) / 4.0;
        p.tier = (1.0 + mean * (MAX_TIER - 1) as f32).round().clamp(1.0, MAX_TIER as f32) as u8;

        before != (p.particles, p.shadow_blur, p.trail, p.effects)
    }

    /// Drop samples and cooldown state (profile is kept across restarts)
    pub fn reset_sampling(&mut self) {
        self.samples.clear();
        self.ticks_since_check = 0;
        self.last_adjust_ms = None;
    }

    /// Configured floor/ceiling pairs, in profile field order
    pub fn bounds(&self) -> [(f32, f32); 4] {
        let t = &self.tuning;
        [
            (t.particle_floor, 1.0),
            (t.shadow_floor, 1.0),
            (t.trail_floor, 1.0),
            (t.effect_floor, 1.0),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(ctrl: &mut QualityController, frame_ms: f64, frames: u32, start_ms: f64) -> f64 {
        let mut now = start_ms;
        for _ in 0..frames {
            now += frame_ms;
            ctrl.sample(frame_ms, now);
        }
        now
    }

    #[test]
    fn test_tier_table() {
        assert_eq!(QualityProfile::for_tier(0).tier, 1);
        assert_eq!(QualityProfile::for_tier(9).tier, 5);
        assert!(!QualityProfile::for_tier(1).glow);
        assert!(QualityProfile::for_tier(5).glow);
    }

    #[test]
    fn test_particle_count_scaling() {
        let low = QualityProfile::for_tier(1);
        assert_eq!(low.particle_count(0), 0);
        assert_eq!(low.particle_count(2), 1);
        assert_eq!(QualityProfile::for_tier(5).particle_count(20), 20);
    }

    #[test]
    fn test_low_fps_lowers_quality() {
        let mut ctrl = QualityController::new(QualityTuning::default(), 5);
        run(&mut ctrl, 40.0, 120, 0.0);
        assert!(ctrl.profile().particles < 1.0);
        assert!(ctrl.profile().tier < 5);
    }

    #[test]
    fn test_cooldown_limits_adjustments() {
        let mut ctrl = QualityController::new(QualityTuning::default(), 5);
        // 1 ms frames at the top tier: nothing left to raise, nothing to lower
        let changes = (0..300)
            .filter_map(|i| ctrl.sample(1.0, i as f64 * 1.6))
            .count();
        assert_eq!(changes, 0, "fast frames should never lower quality");

        // 50 ms frames for 0.9 s: three checks inside one 2 s cooldown
        let mut ctrl = QualityController::new(QualityTuning::default(), 5);
        let mut changes = 0;
        for i in 0..90 {
            if ctrl.sample(50.0, i as f64 * 10.0).is_some() {
                changes += 1;
            }
        }
        assert_eq!(changes, 1);
    }

    #[test]
    fn test_high_fps_raises_toward_ceiling() {
        let mut ctrl = QualityController::new(QualityTuning::default(), 1);
        run(&mut ctrl, 10.0, 3_000, 0.0);
        let p = ctrl.profile();
        assert_eq!(p.particles, 1.0);
        assert_eq!(p.effects, 1.0);
        assert_eq!(p.tier, 5);
    }

    #[test]
    fn test_disabled_controller_holds_profile() {
        let mut ctrl = QualityController::new(QualityTuning::default(), 4);
        ctrl.set_enabled(false);
        run(&mut ctrl, 100.0, 500, 0.0);
        assert_eq!(ctrl.profile(), QualityProfile::for_tier(4));
    }
}
