//! Sensor-guided homing sweep.

use libm::floorf;

use crate::config::units::Degrees;
use crate::config::HomingConfig;
use crate::error::HomingError;
use crate::hal::{AngleSensor, HaltFlag, StepActuator};
use crate::motion::FULL_CYCLE_DEG;

/// Sample capacity for one full sweep at the minimum search increment.
const MAX_SAMPLES: usize = 128;

/// One-shot calibration sweep over a full feed-wheel rotation.
///
/// The sweep steps the wheel in fixed angular increments, reading one
/// sensor sample after each move completes, then moves to the offset of the
/// strongest sample. That offset becomes the new zero reference.
///
/// The wait for each move is a busy poll; the periodic tick context must
/// keep running so steps actually complete and the halt flag stays live.
#[derive(Debug, Clone, Copy)]
pub struct HomingSequencer {
    search_rate: u32,
    search_increment: f32,
}

impl HomingSequencer {
    /// Create a sequencer from homing configuration.
    pub fn new(config: &HomingConfig) -> Self {
        Self {
            search_rate: config.search_rate,
            search_increment: config.search_increment.value(),
        }
    }

    /// Run the sweep and return the selected zero-reference offset.
    ///
    /// Blocks the calling context until done. A raised halt flag aborts
    /// immediately, leaving the axis wherever it stopped; the caller must
    /// re-run the sweep before relying on calibration.
    pub fn run<A, S, H>(
        &self,
        actuator: &mut A,
        sensor: &mut S,
        halt: &H,
        steps_per_angle: f32,
    ) -> Result<Degrees, HomingError>
    where
        A: StepActuator,
        S: AngleSensor,
        H: HaltFlag,
    {
        actuator.enable(true);
        actuator.set_step_rate(self.search_rate);
        actuator.set_moved_last_block(true);

        let increment_steps = floorf(self.search_increment * steps_per_angle) as u32;

        let mut samples: heapless::Vec<i32, MAX_SAMPLES> = heapless::Vec::new();
        let mut swept = 0.0f32;
        while swept <= FULL_CYCLE_DEG {
            actuator.move_steps(true, increment_steps);
            self.wait_for_idle(actuator, halt)?;

            // Capacity covers a full sweep at the minimum increment, which
            // configuration validation enforces.
            if samples.push(sensor.raw_value()).is_err() {
                break;
            }
            swept += self.search_increment;
        }

        // First occurrence wins on ties.
        let mut strongest = 0;
        for (index, sample) in samples.iter().enumerate() {
            if *sample > samples[strongest] {
                strongest = index;
            }
        }

        let offset = strongest as f32 * self.search_increment;
        let offset_steps = floorf(offset * steps_per_angle) as u32;
        if offset_steps > 0 {
            actuator.move_steps(true, offset_steps);
            self.wait_for_idle(actuator, halt)?;
        }

        Ok(Degrees(offset))
    }

    fn wait_for_idle<A, H>(&self, actuator: &mut A, halt: &H) -> Result<(), HomingError>
    where
        A: StepActuator,
        H: HaltFlag,
    {
        while actuator.is_moving() {
            if halt.is_halted() {
                return Err(HomingError::Halted);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::AtomicBool;

    struct SweepActuator {
        moved: Vec<(bool, u32)>,
        enabled: bool,
        rate: u32,
    }

    impl SweepActuator {
        fn new() -> Self {
            Self {
                moved: Vec::new(),
                enabled: false,
                rate: 0,
            }
        }
    }

    impl StepActuator for SweepActuator {
        fn enable(&mut self, enabled: bool) {
            self.enabled = enabled;
        }
        fn move_steps(&mut self, forward: bool, steps: u32) {
            self.moved.push((forward, steps));
        }
        fn stop(&mut self) {}
        fn set_step_rate(&mut self, steps_per_sec: u32) {
            self.rate = steps_per_sec;
        }
        fn step_rate(&self) -> u32 {
            self.rate
        }
        // Moves complete instantly in tests
        fn is_moving(&self) -> bool {
            false
        }
        fn max_rate(&self) -> f32 {
            0.0
        }
        fn set_max_rate(&mut self, _mm_per_sec: f32) {}
        fn set_moved_last_block(&mut self, _moved: bool) {}
    }

    struct ScriptedSensor {
        samples: Vec<i32>,
        index: usize,
    }

    impl AngleSensor for ScriptedSensor {
        fn raw_value(&mut self) -> i32 {
            let value = self.samples.get(self.index).copied().unwrap_or(0);
            self.index += 1;
            value
        }
    }

    fn sensor_peaking_at(index: usize, len: usize) -> ScriptedSensor {
        let mut samples = vec![100; len];
        samples[index] = 900;
        ScriptedSensor { samples, index: 0 }
    }

    #[test]
    fn test_sweep_homes_to_strongest_sample() {
        let config = HomingConfig {
            search_rate: 8000,
            search_increment: Degrees(10.0),
        };
        let sequencer = HomingSequencer::new(&config);
        let mut actuator = SweepActuator::new();
        // 37 samples for a 360 degree sweep at 10 degree increments
        let mut sensor = sensor_peaking_at(12, 37);
        let halt = AtomicBool::new(false);

        let offset = sequencer
            .run(&mut actuator, &mut sensor, &halt, 2.0)
            .unwrap();
        assert_eq!(offset.value(), 120.0);
        assert!(actuator.enabled);
        assert_eq!(actuator.rate, 8000);

        // 37 sweep increments of 20 steps, then the final 240-step move
        assert_eq!(actuator.moved.len(), 38);
        assert_eq!(actuator.moved.last(), Some(&(true, 240)));
    }

    #[test]
    fn test_tie_resolves_to_earlier_offset() {
        let config = HomingConfig::default();
        let sequencer = HomingSequencer::new(&config);
        let mut actuator = SweepActuator::new();
        let mut samples = vec![5; 37];
        samples[4] = 50;
        samples[20] = 50;
        let mut sensor = ScriptedSensor { samples, index: 0 };
        let halt = AtomicBool::new(false);

        let offset = sequencer
            .run(&mut actuator, &mut sensor, &halt, 2.0)
            .unwrap();
        assert_eq!(offset.value(), 40.0);
    }

    #[test]
    fn test_halt_aborts_the_sweep() {
        struct StuckActuator(SweepActuator);
        impl StepActuator for StuckActuator {
            fn enable(&mut self, enabled: bool) {
                self.0.enable(enabled);
            }
            fn move_steps(&mut self, forward: bool, steps: u32) {
                self.0.move_steps(forward, steps);
            }
            fn stop(&mut self) {}
            fn set_step_rate(&mut self, steps_per_sec: u32) {
                self.0.set_step_rate(steps_per_sec);
            }
            fn step_rate(&self) -> u32 {
                self.0.step_rate()
            }
            fn is_moving(&self) -> bool {
                true
            }
            fn max_rate(&self) -> f32 {
                0.0
            }
            fn set_max_rate(&mut self, _mm_per_sec: f32) {}
            fn set_moved_last_block(&mut self, _moved: bool) {}
        }

        let sequencer = HomingSequencer::new(&HomingConfig::default());
        let mut actuator = StuckActuator(SweepActuator::new());
        let mut sensor = ScriptedSensor {
            samples: vec![],
            index: 0,
        };
        let halt = AtomicBool::new(true);
        let result = sequencer.run(&mut actuator, &mut sensor, &halt, 2.0);
        assert_eq!(result, Err(HomingError::Halted));
    }
}
