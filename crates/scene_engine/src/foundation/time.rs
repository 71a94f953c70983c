//! Frame clock driving the engine's frame step
//!
//! Scenes never read wall-clock time; the engine ticks a [`Timer`] once per
//! frame and hands the resulting [`FrameTime`] to the frame uniforms.

use std::time::Instant;

/// Longest wall-clock delta reported in variable mode, in seconds
///
/// Stalls such as a debugger break would otherwise arrive as one huge step.
pub const MAX_VARIABLE_DELTA: f32 = 0.25;

/// How the timer advances on each tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeStep {
    /// Measured wall-clock time, clamped to `max_delta`
    Variable {
        /// Upper bound of a single delta in seconds
        max_delta: f32,
    },
    /// The same delta every frame, regardless of wall-clock time
    Fixed(f32),
}

/// Timing of one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Frame number, starting at 1 for the first tick
    pub frame: u64,
    /// Seconds since the previous frame
    pub delta: f32,
    /// Seconds since the first frame
    pub elapsed: f64,
}

/// Frame clock
#[derive(Debug, Clone)]
pub struct Timer {
    step: TimeStep,
    last_tick: Option<Instant>,
    current: FrameTime,
}

impl Default for Timer {
    fn default() -> Self {
        Self::variable()
    }
}

impl Timer {
    /// Wall-clock timer clamped to [`MAX_VARIABLE_DELTA`]
    pub fn variable() -> Self {
        Self::with_step(TimeStep::Variable {
            max_delta: MAX_VARIABLE_DELTA,
        })
    }

    /// Deterministic timer advancing `step` seconds per tick
    pub fn fixed(step: f32) -> Self {
        Self::with_step(TimeStep::Fixed(step))
    }

    /// Timer with an explicit step mode
    pub fn with_step(step: TimeStep) -> Self {
        Self {
            step,
            last_tick: None,
            current: FrameTime {
                frame: 0,
                delta: 0.0,
                elapsed: 0.0,
            },
        }
    }

    /// Step mode
    pub fn step(&self) -> TimeStep {
        self.step
    }

    /// Whether deltas ignore wall-clock time
    pub fn is_fixed(&self) -> bool {
        matches!(self.step, TimeStep::Fixed(_))
    }

    /// Advance one frame
    ///
    /// In variable mode the first tick reports a zero delta, since there is
    /// no previous frame to measure from.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let delta = match self.step {
            TimeStep::Fixed(step) => step,
            TimeStep::Variable { max_delta } => self
                .last_tick
                .map_or(0.0, |last| now.saturating_duration_since(last).as_secs_f32())
                .min(max_delta),
        };
        self.last_tick = Some(now);
        self.current = FrameTime {
            frame: self.current.frame + 1,
            delta,
            elapsed: self.current.elapsed + f64::from(delta),
        };
        self.current
    }

    /// Back to frame zero, keeping the step mode
    pub fn reset(&mut self) {
        *self = Self::with_step(self.step);
    }

    /// Timing of the most recent tick
    pub fn current(&self) -> FrameTime {
        self.current
    }

    /// Seconds since the previous frame
    pub fn delta_time(&self) -> f32 {
        self.current.delta
    }

    /// Seconds since the first frame
    pub fn total_time(&self) -> f64 {
        self.current.elapsed
    }

    /// Frames ticked so far
    pub fn frame_count(&self) -> u64 {
        self.current.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::time::Duration;

    #[test]
    fn test_fixed_step_ignores_wall_clock() {
        let mut timer = Timer::fixed(0.5);
        assert!(timer.is_fixed());

        let start = Instant::now();
        timer.tick_at(start);
        let frame = timer.tick_at(start + Duration::from_secs(10));

        assert_eq!(frame.frame, 2);
        assert_relative_eq!(frame.delta, 0.5);
        assert_relative_eq!(timer.total_time(), 1.0);
    }

    #[test]
    fn test_variable_first_tick_is_zero_then_measured() {
        let mut timer = Timer::variable();
        let start = Instant::now();

        assert_eq!(timer.tick_at(start).delta, 0.0);
        let frame = timer.tick_at(start + Duration::from_millis(20));
        assert_relative_eq!(frame.delta, 0.02, epsilon = 1e-6);
        assert_eq!(timer.frame_count(), 2);
    }

    #[test]
    fn test_variable_delta_is_clamped() {
        let mut timer = Timer::with_step(TimeStep::Variable { max_delta: 0.1 });
        let start = Instant::now();
        timer.tick_at(start);

        let frame = timer.tick_at(start + Duration::from_secs(3));
        assert_relative_eq!(frame.delta, 0.1);
    }

    #[test]
    fn test_reset_keeps_step_mode() {
        let mut timer = Timer::fixed(0.25);
        timer.tick();
        timer.tick();
        timer.reset();

        assert_eq!(timer.frame_count(), 0);
        assert_eq!(timer.total_time(), 0.0);
        assert_eq!(timer.step(), TimeStep::Fixed(0.25));
    }
}
