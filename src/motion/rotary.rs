//! Shortest-path angle tracking for rotary feed hardware.

use libm::fabsf;

use crate::config::units::{Degrees, Millimeters};
use crate::config::AxisGeometry;

/// One full rotation of the feed wheel, in degrees.
pub const FULL_CYCLE_DEG: f32 = 360.0;

/// Converts absolute spool-angle targets into signed linear travel.
///
/// Rotary feed hardware addresses position as an angle in `[0, 360)`. For a
/// given target the wheel can move four ways: directly, the long way around,
/// or either way relative to the point opposite the current reference. The
/// tracker picks the shortest of the four and remembers the target as the
/// new reference angle.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotaryPositionTracker {
    previous_angle: f32,
}

impl RotaryPositionTracker {
    /// Create a tracker with the reference angle at zero.
    pub fn new() -> Self {
        Self {
            previous_angle: 0.0,
        }
    }

    /// The current reference angle.
    pub fn previous_angle(&self) -> Degrees {
        Degrees(self.previous_angle)
    }

    /// Force the reference angle, as after homing or a position override.
    pub fn set_previous_angle(&mut self, angle: Degrees) {
        self.previous_angle = angle.value();
    }

    /// Reset the reference angle to zero.
    pub fn reset(&mut self) {
        self.previous_angle = 0.0;
    }

    /// Pick the shortest rotation to `target` and return it as signed
    /// linear travel.
    ///
    /// Negative targets are normalized by adding one full cycle. When the
    /// chosen distance is zero the reference angle is left untouched; this
    /// mirrors long-standing firmware behavior and is covered by tests.
    pub fn optimize_angle(&mut self, target: Degrees, geometry: &AxisGeometry) -> Millimeters {
        let mut angle = target.value();
        if angle < 0.0 {
            angle += FULL_CYCLE_DEG;
        }

        // Out-of-band inputs are rescaled into the cycle. The expression is
        // an identity as written; kept to match the behavior other firmware
        // components were tuned against.
        if !(0.0..=FULL_CYCLE_DEG).contains(&angle) {
            angle = (angle / FULL_CYCLE_DEG) * FULL_CYCLE_DEG;
        }

        if angle == self.previous_angle {
            return Millimeters(0.0);
        }

        let previous = self.previous_angle;
        let opposite = if previous >= 180.0 {
            previous - 180.0
        } else {
            previous + 180.0
        };

        // Raw signed differences behind the four candidates. Candidates 2
        // and 4 wrap the other way around the circle.
        let direct = previous - angle;
        let antipodal = opposite - angle;

        let candidates = [
            fabsf(direct),
            FULL_CYCLE_DEG - fabsf(direct),
            fabsf(antipodal),
            FULL_CYCLE_DEG - fabsf(antipodal),
        ];

        // First minimum wins on ties.
        let mut winner = 0;
        for (index, distance) in candidates.iter().enumerate() {
            if *distance < candidates[winner] {
                winner = index;
            }
        }

        if candidates[winner] == 0.0 {
            return Millimeters(0.0);
        }

        let signed_degrees = match winner {
            0 => angle - previous,
            1 => {
                if direct < 0.0 {
                    -candidates[1]
                } else {
                    candidates[1]
                }
            }
            2 => angle - opposite,
            _ => {
                if antipodal < 0.0 {
                    -candidates[3]
                } else {
                    candidates[3]
                }
            }
        };

        self.previous_angle = angle;
        Millimeters(geometry.angle_to_mm(signed_degrees))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> AxisGeometry {
        // 2 steps/deg over 10 steps/mm: 1 degree = 0.2 mm
        AxisGeometry {
            steps_per_mm: 10.0,
            steps_per_angle: 2.0,
            filament_diameter: 0.0,
            volumetric_multiplier: 1.0,
        }
    }

    #[test]
    fn test_wraparound_picks_complement() {
        let geo = geometry();
        let mut tracker = RotaryPositionTracker::new();
        tracker.set_previous_angle(Degrees(350.0));

        // 350 -> 10: direct is 340, wrapping forward is only 20
        let travel = tracker.optimize_angle(Degrees(10.0), &geo);
        assert!((travel.value() - 20.0 * 0.2).abs() < 1e-4);
        assert_eq!(tracker.previous_angle().value(), 10.0);
    }

    #[test]
    fn test_direct_move_is_signed() {
        let geo = geometry();
        let mut tracker = RotaryPositionTracker::new();
        tracker.set_previous_angle(Degrees(30.0));

        let travel = tracker.optimize_angle(Degrees(20.0), &geo);
        assert!((travel.value() - (-10.0 * 0.2)).abs() < 1e-4);
    }

    #[test]
    fn test_negative_target_normalized() {
        let geo = geometry();
        let mut tracker = RotaryPositionTracker::new();

        // -10 normalizes to 350; shortest from 0 is -10 degrees
        let travel = tracker.optimize_angle(Degrees(-10.0), &geo);
        assert!((travel.value() - (-10.0 * 0.2)).abs() < 1e-4);
        assert_eq!(tracker.previous_angle().value(), 350.0);
    }

    #[test]
    fn test_equal_target_is_a_no_op() {
        let geo = geometry();
        let mut tracker = RotaryPositionTracker::new();
        tracker.set_previous_angle(Degrees(90.0));

        let travel = tracker.optimize_angle(Degrees(90.0), &geo);
        assert_eq!(travel.value(), 0.0);
        assert_eq!(tracker.previous_angle().value(), 90.0);
    }

    #[test]
    fn test_out_of_band_target_passes_rescale_unchanged() {
        let geo = geometry();
        let mut tracker = RotaryPositionTracker::new();
        tracker.set_previous_angle(Degrees(350.0));

        // 370 lies outside the cycle, but the rescale maps it to itself:
        // the move is the direct 20 degrees and the new reference angle
        // escapes [0, 360)
        let travel = tracker.optimize_angle(Degrees(370.0), &geo);
        assert!((travel.value() - 20.0 * 0.2).abs() < 1e-3);
        assert!(tracker.previous_angle().value() > FULL_CYCLE_DEG);
        assert!((tracker.previous_angle().value() - 370.0).abs() < 1e-3);
    }

    #[test]
    fn test_antipodal_target_keeps_reference() {
        let geo = geometry();
        let mut tracker = RotaryPositionTracker::new();
        tracker.set_previous_angle(Degrees(10.0));

        // Target exactly opposite the reference: candidate 3 is zero, and
        // the reference angle is deliberately not advanced.
        let travel = tracker.optimize_angle(Degrees(190.0), &geo);
        assert_eq!(travel.value(), 0.0);
        assert_eq!(tracker.previous_angle().value(), 10.0);
    }
}
