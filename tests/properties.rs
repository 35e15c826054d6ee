//! Property tests for the numeric motion components.

mod common;

use common::{MockActuator, MockQueue, ScriptedSensor};
use extruder_motion::config::AxisOffsets;
use extruder_motion::{
    AccelerationScheduler, AxisCommand, AxisConfig, AxisController, AxisGeometry, BlockHandle,
    CubicMmPerSec, Degrees, HomingConfig, Millimeters, MmPerSec, MotionEvents, PlannedBlock,
    RateLimiter, RetractConfig, RotaryPositionTracker,
};
use proptest::prelude::*;

fn geometry() -> AxisGeometry {
    AxisGeometry {
        steps_per_mm: 10.0,
        steps_per_angle: 2.0,
        filament_diameter: 0.0,
        volumetric_multiplier: 1.0,
    }
}

fn config() -> AxisConfig {
    AxisConfig {
        name: heapless::String::try_from("extruder").unwrap(),
        steps_per_mm: 10.0,
        steps_per_angle: 2.0,
        filament_diameter: Millimeters(0.0),
        acceleration: 1000.0,
        default_feed_rate: MmPerSec(45.0),
        max_rate: MmPerSec(1000.0),
        rotary_feed: false,
        acceleration_ticks_per_second: 1000.0,
        offset: AxisOffsets::default(),
        retract: RetractConfig::default(),
        homing: HomingConfig::default(),
    }
}

proptest! {
    /// The chosen rotation is never beaten by any of the four candidate
    /// paths, and converting the linear travel back to degrees reproduces
    /// the winning magnitude.
    #[test]
    fn rotary_choice_is_the_shortest_candidate(
        previous in 0.0f32..360.0,
        target in 0.0f32..360.0,
    ) {
        let geo = geometry();
        let mut tracker = RotaryPositionTracker::new();
        tracker.set_previous_angle(Degrees(previous));

        let travel = tracker.optimize_angle(Degrees(target), &geo);
        let chosen_deg = (travel.value() * geo.steps_per_mm / geo.steps_per_angle).abs();

        let opposite = if previous >= 180.0 {
            previous - 180.0
        } else {
            previous + 180.0
        };
        let direct = (previous - target).abs();
        let antipodal = (opposite - target).abs();
        let candidates = [direct, 360.0 - direct, antipodal, 360.0 - antipodal];
        let shortest = candidates.iter().cloned().fold(f32::INFINITY, f32::min);

        for candidate in candidates {
            prop_assert!(chosen_deg <= candidate + 1e-2);
        }
        prop_assert!((chosen_deg - shortest).abs() < 1e-2);
    }

    /// The rate multiplier stays in (0, 1] and is the identity whenever
    /// neither limit is exceeded.
    #[test]
    fn rate_multiplier_is_in_unit_interval(
        target in 0.01f32..100.0,
        inverse_seconds in 0.01f32..100.0,
        max_volumetric in 0.0f32..50.0,
        max_rate in 0.0f32..200.0,
    ) {
        let mut geo = geometry();
        geo.set_filament_diameter(1.75);
        let mut limiter = RateLimiter::new();
        limiter.set_absolute(false);

        let rm = limiter.check(
            target,
            inverse_seconds,
            &geo,
            CubicMmPerSec(max_volumetric),
            MmPerSec(max_rate),
        );
        prop_assert!(rm > 0.0);
        prop_assert!(rm <= 1.0);

        let flow = target * inverse_seconds;
        let speed = target * geo.volumetric_multiplier * inverse_seconds;
        let volumetric_ok = max_volumetric == 0.0 || flow <= max_volumetric;
        let linear_ok = max_rate == 0.0 || speed <= max_rate;
        if volumetric_ok && linear_ok {
            prop_assert_eq!(rm, 1.0);
        }
    }

    /// The Solo ramp is non-decreasing, never overshoots the target rate,
    /// and converges within ceil(target / increment) ticks.
    #[test]
    fn solo_ramp_is_monotone_and_converges(
        feed_rate in 1.0f32..100.0,
        acceleration in 100.0f32..5000.0,
    ) {
        let steps_per_mm = 80.0;
        let scheduler = AccelerationScheduler::new(acceleration, 1000.0);
        let increment = scheduler.rate_increment(steps_per_mm);
        prop_assume!(increment > 0);

        let target = scheduler.target_rate(feed_rate, steps_per_mm);
        let max_ticks = target / increment + 2;

        let mut rate = 0u32;
        let mut ticks = 0u32;
        while rate < target {
            let next = scheduler.next_rate(rate, feed_rate, steps_per_mm);
            prop_assert!(next > rate);
            prop_assert!(next <= target);
            rate = next;
            ticks += 1;
            prop_assert!(ticks <= max_ticks);
        }
        prop_assert_eq!(rate, target);
    }

    /// Sub-step remainders carry between blocks without unbounded drift,
    /// and every taken block is released exactly once.
    #[test]
    fn step_carry_never_drifts(
        feeds in prop::collection::vec(-0.3f32..0.3, 1..30),
    ) {
        let mut axis =
            AxisController::new(config(), MockActuator::new(), ScriptedSensor::new(vec![]))
                .unwrap();
        axis.set_enabled(true);
        let mut queue = MockQueue::new();

        let mut total = 0.0f64;
        for (index, feed) in feeds.iter().enumerate() {
            axis.on_command(&AxisCommand::solo_feed(*feed, false));
            axis.on_block_begin(
                &mut queue,
                &PlannedBlock {
                    handle: BlockHandle(index),
                    total_steps: 100,
                    nominal_rate: 100.0,
                    travel_mm: 0.0,
                },
            );
            axis.actuator_mut().moving = false;
            axis.on_actuator_finished(&mut queue);
            axis.on_block_end();
            total += f64::from(*feed);
        }

        let stepped = axis.actuator().net_steps() as f64 / 10.0;
        prop_assert!((stepped - total).abs() < 0.2);
        prop_assert_eq!(queue.takes.len(), queue.releases.len());
    }
}
