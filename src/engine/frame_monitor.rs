//! Rolling frame-rate monitor
//!
//! Tracks achieved FPS over a window of recent frames. When FPS stays
//! critically low for several consecutive checks the monitor switches to
//! rendering every other frame. Frame skipping never engages during the
//! opening grace period of a session.

use std::collections::VecDeque;

use crate::tuning::QualityTuning;

#[derive(Debug, Clone)]
pub struct FrameRateMonitor {
    samples: VecDeque<f64>,
    window: usize,
    check_interval: u32,
    critical_fps: f32,
    critical_checks: u32,
    grace_ms: f64,
    frames_since_check: u32,
    critical_streak: u32,
    frame_skip: bool,
    frame_parity: bool,
}

impl FrameRateMonitor {
    pub fn new(tuning: &QualityTuning) -> Self {
        Self {
            samples: VecDeque::with_capacity(tuning.window),
            window: tuning.window.max(1),
            check_interval: tuning.check_interval.max(1),
            critical_fps: tuning.critical_fps,
            critical_checks: tuning.critical_checks.max(1),
            grace_ms: tuning.frame_skip_grace_ms,
            frames_since_check: 0,
            critical_streak: 0,
            frame_skip: false,
            frame_parity: false,
        }
    }

    /// Record one frame duration (ms). `session_ms` is time since the session started.
    pub fn record(&mut self, frame_ms: f64, session_ms: f64) {
        if frame_ms <= 0.0 {
            return;
        }
        self.samples.push_back(frame_ms);
        while self.samples.len() > self.window {
            self.samples.pop_front();
        }

        self.frames_since_check += 1;
        if self.frames_since_check < self.check_interval {
            return;
        }
        self.frames_since_check = 0;

        if session_ms < self.grace_ms {
            self.critical_streak = 0;
            self.frame_skip = false;
            return;
        }

        let fps = self.fps();
        if fps > 0.0 && fps < self.critical_fps {
            self.critical_streak += 1;
            if self.critical_streak >= self.critical_checks && !self.frame_skip {
                log::warn!("FPS critically low ({fps:.1}), rendering every other frame");
                self.frame_skip = true;
            }
        } else {
            self.critical_streak = 0;
            if self.frame_skip {
                log::info!("FPS recovered ({fps:.1}), frame skipping disabled");
            }
            self.frame_skip = false;
        }
    }

    /// Average FPS over the window (0 until the first sample)
    pub fn fps(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let avg = self.samples.iter().sum::<f64>() / self.samples.len() as f64;
        if avg <= 0.0 { 0.0 } else { (1000.0 / avg) as f32 }
    }

    pub fn frame_skip_active(&self) -> bool {
        self.frame_skip
    }

    /// Whether this frame should be rendered (call once per frame)
    pub fn should_render(&mut self) -> bool {
        if !self.frame_skip {
            return true;
        }
        self.frame_parity = !self.frame_parity;
        self.frame_parity
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.frames_since_check = 0;
        self.critical_streak = 0;
        self.frame_skip = false;
        self.frame_parity = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(monitor: &mut FrameRateMonitor, frame_ms: f64, frames: u32, start_ms: f64) -> f64 {
        let mut t = start_ms;
        for _ in 0..frames {
            t += frame_ms;
            monitor.record(frame_ms, t);
        }
        t
    }

    #[test]
    fn test_fps_average() {
        let mut m = FrameRateMonitor::new(&QualityTuning::default());
        feed(&mut m, 1000.0 / 60.0, 60, 0.0);
        assert!((m.fps() - 60.0).abs() < 0.5);
    }

    #[test]
    fn test_no_frame_skip_during_grace() {
        let mut m = FrameRateMonitor::new(&QualityTuning::default());
        // 10 FPS, but only 1.5 seconds of session time
        for i in 0..150 {
            m.record(100.0, i as f64 * 10.0);
        }
        assert!(!m.frame_skip_active());
    }

    #[test]
    fn test_persistent_low_fps_enables_skip() {
        let mut m = FrameRateMonitor::new(&QualityTuning::default());
        feed(&mut m, 100.0, 200, 2_000.0);
        assert!(m.frame_skip_active());
        let rendered = (0..10).filter(|_| m.should_render()).count();
        assert_eq!(rendered, 5);

        // Recovery turns it back off
        feed(&mut m, 1000.0 / 60.0, 120, 30_000.0);
        assert!(!m.frame_skip_active());
        assert!(m.should_render());
    }
}
