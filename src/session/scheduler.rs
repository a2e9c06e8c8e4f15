//! Fixed-Timestep Scheduler
//!
//! Turns variable host frame deltas into a whole number of fixed simulation
//! steps. Leftover time carries into the next frame; a backlog beyond
//! `max_steps_per_frame` is dropped instead of being caught up.

use std::time::Duration;

/// Outcome of feeding one frame into the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepPlan {
    /// Ticks the caller should run now
    pub ticks_to_run: u32,
    /// Time discarded because the frame was too long
    pub dropped_backlog: Duration,
}

/// Accumulator-based fixed-step clock.
#[derive(Clone, Debug)]
pub struct FixedStepScheduler {
    step: Duration,
    max_steps_per_frame: u32,
    accumulator: Duration,
}

impl FixedStepScheduler {
    /// Scheduler running `tick_rate` steps per second.
    ///
    /// Zero rates and caps are bumped to 1.
    pub fn new(tick_rate: u32, max_steps_per_frame: u32) -> Self {
        let tick_rate = tick_rate.max(1);
        Self {
            step: Duration::from_nanos(1_000_000_000 / tick_rate as u64),
            max_steps_per_frame: max_steps_per_frame.max(1),
            accumulator: Duration::ZERO,
        }
    }

    /// Length of one step.
    #[inline]
    pub fn step(&self) -> Duration {
        self.step
    }

    #[inline]
    pub fn accumulator(&self) -> Duration {
        self.accumulator
    }

    #[inline]
    pub fn max_steps_per_frame(&self) -> u32 {
        self.max_steps_per_frame
    }

    /// Add a frame delta and plan the steps to run.
    pub fn advance(&mut self, frame_dt: Duration) -> StepPlan {
        let mut accumulator = self.accumulator.saturating_add(frame_dt);
        let mut ticks_to_run = 0u32;

        while accumulator >= self.step && ticks_to_run < self.max_steps_per_frame {
            accumulator = accumulator.saturating_sub(self.step);
            ticks_to_run += 1;
        }

        let dropped_backlog = if accumulator >= self.step {
            std::mem::replace(&mut accumulator, Duration::ZERO)
        } else {
            Duration::ZERO
        };

        if !dropped_backlog.is_zero() {
            tracing::debug!(
                dropped_ms = dropped_backlog.as_millis() as u64,
                max_steps = self.max_steps_per_frame,
                "frame backlog dropped"
            );
        }

        self.accumulator = accumulator;
        StepPlan { ticks_to_run, dropped_backlog }
    }

    /// Fraction of a step left in the accumulator, for render interpolation.
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / self.step.as_secs_f32()
    }

    /// Forget any accumulated time.
    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_whole_steps_and_carries_remainder() {
        let mut scheduler = FixedStepScheduler::new(60, 5);
        let step = scheduler.step();

        let plan = scheduler.advance(step * 2 + step / 2);
        assert_eq!(plan.ticks_to_run, 2);
        assert_eq!(plan.dropped_backlog, Duration::ZERO);
        assert_eq!(scheduler.accumulator(), step / 2);

        // The carried half step completes on the next frame
        let plan = scheduler.advance(step / 2);
        assert_eq!(plan.ticks_to_run, 1);
        assert_eq!(scheduler.accumulator(), Duration::ZERO);
    }

    #[test]
    fn test_short_frames_accumulate() {
        let mut scheduler = FixedStepScheduler::new(60, 5);
        let half = scheduler.step() / 2;
        let ran: u32 = (0..4).map(|_| scheduler.advance(half).ticks_to_run).sum();
        assert_eq!(ran, 2);
        assert_eq!(scheduler.accumulator(), Duration::ZERO);

        // Truncated quarters fall a few nanoseconds short of a second step
        let quarter = scheduler.step() / 4;
        let ran: u32 = (0..8).map(|_| scheduler.advance(quarter).ticks_to_run).sum();
        assert_eq!(ran, 1);
        assert_eq!(scheduler.accumulator(), quarter * 8 - scheduler.step());
        assert_eq!(scheduler.advance(quarter).ticks_to_run, 1);
    }

    #[test]
    fn test_long_frame_is_capped() {
        let mut scheduler = FixedStepScheduler::new(60, 5);
        let plan = scheduler.advance(Duration::from_secs(1));

        assert_eq!(plan.ticks_to_run, 5);
        assert!(plan.dropped_backlog > Duration::ZERO);
        assert_eq!(scheduler.accumulator(), Duration::ZERO);
    }

    #[test]
    fn test_reset_and_alpha() {
        let mut scheduler = FixedStepScheduler::new(60, 5);
        let step = scheduler.step();
        scheduler.advance(step / 2);
        assert!((scheduler.alpha() - 0.5).abs() < 0.01);

        scheduler.reset();
        assert_eq!(scheduler.accumulator(), Duration::ZERO);
        assert_eq!(scheduler.advance(Duration::ZERO).ticks_to_run, 0);
    }

    #[test]
    fn test_zero_rate_is_clamped() {
        let scheduler = FixedStepScheduler::new(0, 0);
        assert_eq!(scheduler.step(), Duration::from_secs(1));
        assert_eq!(scheduler.max_steps_per_frame(), 1);
    }
}
