//! Tick-driven rate ramp for self-driven moves.

use libm::floorf;

/// Linear acceleration ramp for Solo moves.
///
/// Solo motion is decoupled from the primary trajectory planner, so instead
/// of a precomputed trapezoidal profile the rate is raised by a fixed
/// increment on every acceleration tick until it reaches the commanded feed
/// rate. There is no deceleration phase; the move simply runs out of steps.
#[derive(Debug, Clone, Copy)]
pub struct AccelerationScheduler {
    acceleration: f32,
    ticks_per_second: f32,
}

impl AccelerationScheduler {
    /// Create a scheduler for the given acceleration in mm/s² and tick rate.
    pub fn new(acceleration: f32, ticks_per_second: f32) -> Self {
        Self {
            acceleration,
            ticks_per_second,
        }
    }

    /// Configured acceleration in mm/s².
    pub fn acceleration(&self) -> f32 {
        self.acceleration
    }

    /// Replace the acceleration (runtime setting edit).
    pub fn set_acceleration(&mut self, acceleration: f32) {
        self.acceleration = acceleration;
    }

    /// Per-tick rate increment in steps/s.
    #[inline]
    pub fn rate_increment(&self, steps_per_mm: f32) -> u32 {
        floorf((self.acceleration / self.ticks_per_second) * steps_per_mm) as u32
    }

    /// Target step rate for a commanded feed rate in mm/s.
    #[inline]
    pub fn target_rate(&self, feed_rate: f32, steps_per_mm: f32) -> u32 {
        floorf(feed_rate * steps_per_mm) as u32
    }

    /// Rate to command after one tick at `current` steps/s.
    ///
    /// Never lowers an already-reached rate and never exceeds the target.
    pub fn next_rate(&self, current: u32, feed_rate: f32, steps_per_mm: f32) -> u32 {
        let target = self.target_rate(feed_rate, steps_per_mm);
        if current >= target {
            return current;
        }
        (current + self.rate_increment(steps_per_mm)).min(target)
    }
}
