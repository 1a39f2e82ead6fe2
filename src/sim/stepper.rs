//! Fixed timestep scheduler
//!
//! Turns variable frame times from `requestAnimationFrame` into a whole number
//! of simulation ticks, so gameplay speed doesn't depend on refresh rate.

use crate::consts::MAX_SUBSTEPS;

#[derive(Debug, Clone)]
pub struct FixedStep {
    step_ms: f64,
    accumulator: f64,
    last_time: Option<f64>,
    max_substeps: u32,
}

impl FixedStep {
    pub fn new(step_ms: f64) -> Self {
        Self {
            step_ms,
            accumulator: 0.0,
            last_time: None,
            max_substeps: MAX_SUBSTEPS,
        }
    }

    pub fn step_ms(&self) -> f64 {
        self.step_ms
    }

    /// Feed the current frame timestamp; returns how many ticks to run
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        let frame = match self.last_time {
            Some(last) => (now_ms - last).max(0.0),
            None => self.step_ms,
        };
        self.last_time = Some(now_ms);

        // A long stall (hidden tab, debugger) must not replay minutes of gameplay
        let frame = frame.min(self.step_ms * self.max_substeps as f64);
        self.accumulator += frame;

        let mut substeps = 0;
        while self.accumulator >= self.step_ms && substeps < self.max_substeps {
            self.accumulator -= self.step_ms;
            substeps += 1;
        }
        substeps
    }

    /// Forget timing history (after restart or when the tab becomes visible)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_time = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_runs_one_tick() {
        let mut step = FixedStep::new(100.0);
        assert_eq!(step.advance(1234.0), 1);
    }

    #[test]
    fn test_accumulates_partial_frames() {
        let mut step = FixedStep::new(100.0);
        assert_eq!(step.advance(0.0), 1);
        assert_eq!(step.advance(50.0), 0);
        assert_eq!(step.advance(100.0), 1);
        assert_eq!(step.advance(250.0), 1);
        assert_eq!(step.advance(300.0), 1);
    }

    #[test]
    fn test_long_stall_is_capped() {
        let mut step = FixedStep::new(100.0);
        step.advance(0.0);
        assert_eq!(step.advance(60_000.0), MAX_SUBSTEPS);
        assert_eq!(step.advance(60_000.0), 0);
    }

    #[test]
    fn test_reset_forgets_history() {
        let mut step = FixedStep::new(100.0);
        step.advance(0.0);
        step.advance(50.0);
        step.reset();
        assert_eq!(step.advance(10_000.0), 1);
        assert_eq!(step.advance(10_050.0), 0);
    }

    #[test]
    fn test_clock_going_backwards() {
        let mut step = FixedStep::new(100.0);
        step.advance(500.0);
        assert_eq!(step.advance(400.0), 0);
    }
}
