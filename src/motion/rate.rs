//! Flow and speed limiting for planned moves.

use libm::fabsf;

use crate::config::units::{CubicMmPerSec, MmPerSec};
use crate::config::AxisGeometry;

/// Converts a requested feed delta into an admissible rate multiplier.
///
/// The planner proposes a move as a `(target, inverse_seconds)` pair before
/// committing its rate. The limiter answers with a multiplier in `(0, 1]`
/// that the caller applies to the whole multi-axis move, so one axis's flow
/// limit can throttle an entire block.
///
/// The milestone position is tracked here, independently of axis mode and
/// enablement, so limiting stays correct across mode changes.
#[derive(Debug, Clone, Copy)]
pub struct RateLimiter {
    last_position: f32,
    absolute: bool,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    /// Create a limiter with absolute milestone accounting from zero.
    pub fn new() -> Self {
        Self {
            last_position: 0.0,
            absolute: true,
        }
    }

    /// Switch between absolute and relative milestone accounting.
    pub fn set_absolute(&mut self, absolute: bool) {
        self.absolute = absolute;
    }

    /// Whether milestone accounting is absolute.
    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    /// Override the milestone position, as after a position override.
    pub fn set_position(&mut self, position: f32) {
        self.last_position = position;
    }

    /// The current milestone position.
    pub fn position(&self) -> f32 {
        self.last_position
    }

    /// Check a proposed move against the volumetric and linear rate limits.
    ///
    /// `target` is the requested feed value (absolute or relative per the
    /// current accounting mode) and `inverse_seconds` the reciprocal of the
    /// move duration. Returns the admissible rate multiplier; `1.0` when no
    /// limit is exceeded. Updates the milestone position as a side effect.
    pub fn check(
        &mut self,
        target: f32,
        inverse_seconds: f32,
        geometry: &AxisGeometry,
        max_volumetric_rate: CubicMmPerSec,
        max_rate: MmPerSec,
    ) -> f32 {
        let delta = if self.absolute {
            let delta = fabsf(target - self.last_position);
            self.last_position = target;
            delta
        } else {
            self.last_position += target;
            target
        };

        let mut isecs = inverse_seconds;
        let mut rm = 1.0;

        if geometry.is_volumetric() && max_volumetric_rate.value() > 0.0 {
            // delta is mm³ in volumetric mode
            let flow = delta * isecs;
            if flow > max_volumetric_rate.value() {
                rm = max_volumetric_rate.value() / flow;
                // Shrink the time base so the linear check sees the
                // already-throttled move.
                isecs *= rm;
            }
        }

        if max_rate.value() > 0.0 {
            let delta_mm = if geometry.is_volumetric() {
                delta * geometry.volumetric_multiplier
            } else {
                delta
            };
            let speed = delta_mm * isecs;
            if speed > max_rate.value() {
                rm *= max_rate.value() / speed;
            }
        }

        rm
    }
}
