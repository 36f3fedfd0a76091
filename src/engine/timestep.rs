//! Fixed timestep accumulator
//!
//! Wall-clock time is accumulated and converted into whole simulation steps.
//! The number of steps performed after any sequence of deltas is always
//! `floor(total / step)`: the step count is derived from the running total
//! instead of repeatedly subtracting from a float remainder, so rounding
//! never drifts the count.

/// Accumulates frame deltas into fixed simulation steps
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: f64,
    elapsed: f64,
    performed: u64,
}

impl FixedTimestep {
    pub fn new(step: f64) -> Self {
        debug_assert!(step > 0.0);
        Self {
            step,
            elapsed: 0.0,
            performed: 0,
        }
    }

    /// Step length in seconds
    #[inline]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Add a wall-clock delta (seconds) and return how many steps are now due
    pub fn accumulate(&mut self, dt: f64) -> u32 {
        if dt > 0.0 {
            self.elapsed += dt;
        }
        let due = (self.elapsed / self.step).floor() as u64;
        let steps = due.saturating_sub(self.performed);
        self.performed = self.performed.max(due);
        steps as u32
    }

    /// Leftover time not yet consumed by a step (seconds)
    pub fn remainder(&self) -> f64 {
        (self.elapsed - self.performed as f64 * self.step).max(0.0)
    }

    /// Interpolation factor between the last two steps (0..1)
    pub fn alpha(&self) -> f32 {
        (self.remainder() / self.step).clamp(0.0, 1.0) as f32
    }

    /// Total steps performed since the last reset
    pub fn total_steps(&self) -> u64 {
        self.performed
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.performed = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: f64 = 1.0 / 60.0;

    #[test]
    fn test_small_deltas_accumulate() {
        let mut ts = FixedTimestep::new(STEP);
        assert_eq!(ts.accumulate(STEP * 0.5), 0);
        assert_eq!(ts.accumulate(STEP * 0.6), 1);
        assert_eq!(ts.total_steps(), 1);
        assert!(ts.remainder() > 0.0 && ts.remainder() < STEP);
    }

    #[test]
    fn test_large_delta_catches_up() {
        let mut ts = FixedTimestep::new(STEP);
        assert_eq!(ts.accumulate(0.1), 6);
        assert_eq!(ts.total_steps(), 6);
    }

    #[test]
    fn test_negative_delta_ignored() {
        let mut ts = FixedTimestep::new(STEP);
        ts.accumulate(0.05);
        assert_eq!(ts.accumulate(-1.0), 0);
        assert_eq!(ts.total_steps(), 3);
    }

    #[test]
    fn test_reset() {
        let mut ts = FixedTimestep::new(STEP);
        ts.accumulate(1.0);
        ts.reset();
        assert_eq!(ts.total_steps(), 0);
        assert_eq!(ts.remainder(), 0.0);
    }
}
