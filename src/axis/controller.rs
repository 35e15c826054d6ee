//! Top-level feed-axis state machine.

use core::fmt::{self, Write};

use libm::floorf;

use crate::command::AxisCommand;
use crate::config::units::{CubicMmPerSec, Degrees, Millimeters, MmPerSec};
use crate::config::{validate_config, AxisConfig, AxisGeometry, AxisOffsets, RetractConfig};
use crate::error::Result;
use crate::hal::{
    AngleSensor, BlockQueue, CommandSink, HaltFlag, PlannedBlock, StepActuator,
};
use crate::motion::{AccelerationScheduler, RateLimiter, RotaryPositionTracker, FULL_CYCLE_DEG};

use super::{HomingSequencer, RetractController};

/// Axis drive mode, recomputed once per motion command and latched until
/// the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisMode {
    /// No active extrusion demand.
    #[default]
    Off,
    /// The axis steps on its own, ramped by the acceleration scheduler.
    Solo,
    /// The axis step rate is slaved to the primary trajectory's rate.
    Follow,
}

/// Reference held on a planner block between block-begin and release.
#[derive(Debug, Clone, Copy)]
struct HeldBlock {
    handle: crate::hal::BlockHandle,
    steps_to_move: u32,
    total_steps: u32,
}

/// Position and mode snapshot for save/restore around state-sensitive
/// queue operations.
#[derive(Debug, Clone, Copy)]
struct SavedState {
    current_position: f32,
    target_position: f32,
    current_angle: f32,
    target_angle: f32,
    mode: AxisMode,
}

/// Block-lifecycle and tick events delivered by the external motion queue
/// and the periodic scheduler.
///
/// `on_block_begin`, `on_block_end` and the command path run in the
/// cooperative command-processing context; `on_tick`, `on_speed_change` and
/// `on_actuator_finished` run in the periodic tick context. Compound
/// updates on the command side must not be torn by the tick side; callers
/// on bare-metal targets are expected to hold a critical section around
/// command-side entry points.
pub trait MotionEvents {
    /// A block was dequeued for execution.
    fn on_block_begin<Q: BlockQueue>(&mut self, queue: &mut Q, block: &PlannedBlock);

    /// The current block finished executing on the primary axes.
    fn on_block_end(&mut self);

    /// The primary trajectory's step rate changed; `None` signals a
    /// queue flush.
    fn on_speed_change<Q: BlockQueue>(&mut self, queue: &mut Q, steps_per_sec: Option<f32>);

    /// One acceleration tick elapsed.
    fn on_tick(&mut self);

    /// The actuator finished its commanded move.
    fn on_actuator_finished<Q: BlockQueue>(&mut self, queue: &mut Q);
}

/// The filament-feed axis controller.
///
/// Owns the derived geometry, position and angle state, the mode machine
/// and the retract/homing/rate sub-sequencers, and drives one
/// [`StepActuator`]. Block lifecycle is delivered through [`MotionEvents`].
pub struct AxisController<A: StepActuator, S: AngleSensor> {
    config: AxisConfig,
    geometry: AxisGeometry,
    actuator: A,
    sensor: S,

    mode: AxisMode,
    enabled: bool,

    current_position: f32,
    target_position: f32,
    current_angle: f32,
    target_angle: f32,

    /// Sub-step remainder carried between blocks, in mm.
    unstepped_distance: f32,

    /// Per-block scratch: this block's linear travel in mm.
    travel_distance: f32,

    /// Per-block scratch: Follow-mode feed per mm of primary travel.
    travel_ratio: f32,

    /// Solo feed rate in mm/s, captured from commands.
    feed_rate: f32,

    /// Flow multiplier (1.0 = 100%).
    extruder_multiplier: f32,

    max_volumetric_rate: CubicMmPerSec,

    held: Option<HeldBlock>,
    limiter: RateLimiter,
    tracker: RotaryPositionTracker,
    scheduler: AccelerationScheduler,
    retract: RetractController,
    homing: HomingSequencer,
    saved: Option<SavedState>,
}

impl<A: StepActuator, S: AngleSensor> AxisController<A, S> {
    /// Bind a validated configuration to an actuator and angle sensor.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if validation fails.
    pub fn new(config: AxisConfig, mut actuator: A, sensor: S) -> Result<Self> {
        validate_config(&config)?;

        let geometry = AxisGeometry::from_config(&config);
        actuator.set_max_rate(config.max_rate.value());

        let scheduler =
            AccelerationScheduler::new(config.acceleration, config.acceleration_ticks_per_second);
        let retract = RetractController::new(config.retract.clone());
        let homing = HomingSequencer::new(&config.homing);
        let feed_rate = config.default_feed_rate.value();

        Ok(Self {
            config,
            geometry,
            actuator,
            sensor,
            mode: AxisMode::Off,
            enabled: false,
            current_position: 0.0,
            target_position: 0.0,
            current_angle: 0.0,
            target_angle: 0.0,
            unstepped_distance: 0.0,
            travel_distance: 0.0,
            travel_ratio: 0.0,
            feed_rate,
            extruder_multiplier: 1.0,
            max_volumetric_rate: CubicMmPerSec(0.0),
            held: None,
            limiter: RateLimiter::new(),
            tracker: RotaryPositionTracker::new(),
            scheduler,
            retract,
            homing,
            saved: None,
        })
    }

    /// Current drive mode.
    pub fn mode(&self) -> AxisMode {
        self.mode
    }

    /// The bound step actuator.
    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Mutable access to the bound step actuator, for firmware glue that
    /// services it directly.
    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    /// Whether the axis responds to block events.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the axis, energizing or releasing the motor.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.actuator.enable(enabled);
    }

    /// Evaluate a motion command and latch the drive mode for its block.
    ///
    /// A feed amount with zero accompanying travel selects [`AxisMode::Solo`],
    /// with travel selects [`AxisMode::Follow`], and a command without one
    /// selects [`AxisMode::Off`]. Feed-rate words are captured, clamped to
    /// the configured maximum rate.
    pub fn on_command(&mut self, command: &AxisCommand) -> AxisMode {
        self.retract.note_command(command);

        if let Some(rate) = command.feed_rate {
            let max = self.actuator.max_rate();
            self.feed_rate = if max > 0.0 && rate.value() > max {
                max
            } else {
                rate.value()
            };
        }

        let Some(feed) = command.feed else {
            self.mode = AxisMode::Off;
            return self.mode;
        };

        self.limiter.set_absolute(command.absolute);

        if self.config.rotary_feed && command.is_solo_travel() {
            // Rotary hardware addresses Solo feed as an absolute spool angle.
            let travel = self.tracker.optimize_angle(Degrees(feed), &self.geometry);
            self.target_angle = self.tracker.previous_angle().value();
            self.target_position += travel.value();
            self.travel_distance = travel.value();
            self.mode = AxisMode::Solo;
            return self.mode;
        }

        let relative = if command.absolute {
            let delta = feed - self.target_position;
            self.target_position = feed;
            delta
        } else {
            self.target_position += feed;
            feed
        };

        let scaled = relative * self.geometry.volumetric_multiplier * self.extruder_multiplier;

        if command.is_solo_travel() {
            self.travel_distance = scaled;
            self.mode = AxisMode::Solo;
        } else {
            self.travel_ratio = scaled / command.travel.value();
            self.mode = AxisMode::Follow;
        }
        self.mode
    }

    /// Check a proposed `(target, inverse_seconds)` move against the rate
    /// limits.
    ///
    /// Returns the admissible rate multiplier for the whole move, or `None`
    /// while the axis is disabled.
    pub fn max_rate_factor(&mut self, target: f32, inverse_seconds: f32) -> Option<f32> {
        if !self.enabled {
            return None;
        }
        Some(self.limiter.check(
            target,
            inverse_seconds,
            &self.geometry,
            self.max_volumetric_rate,
            MmPerSec(self.actuator.max_rate()),
        ))
    }

    /// Trigger the retract sequence. Returns `false` if already retracted.
    pub fn retract<Q: BlockQueue + CommandSink>(&mut self, queue: &mut Q) -> bool {
        self.retract.retract(queue)
    }

    /// Trigger the recover sequence. Returns `false` if not retracted.
    pub fn unretract<Q: BlockQueue + CommandSink>(&mut self, queue: &mut Q) -> bool {
        self.retract.unretract(queue)
    }

    /// Whether the filament is currently retracted.
    pub fn is_retracted(&self) -> bool {
        self.retract.is_retracted()
    }

    /// Run the homing sweep and rezero the axis at the selected offset.
    ///
    /// Enables the actuator as a side effect. On success all position and
    /// angle state is reset to the new zero reference; on halt the state is
    /// left untouched and uncalibrated.
    pub fn home<H: HaltFlag>(&mut self, halt: &H) -> Result<Degrees> {
        let offset = self.homing.run(
            &mut self.actuator,
            &mut self.sensor,
            halt,
            self.geometry.steps_per_angle,
        )?;

        self.enabled = true;
        self.current_position = 0.0;
        self.target_position = 0.0;
        self.current_angle = 0.0;
        self.target_angle = 0.0;
        self.unstepped_distance = 0.0;
        self.travel_distance = 0.0;
        self.travel_ratio = 0.0;
        self.tracker.reset();
        self.limiter.set_position(0.0);

        Ok(offset)
    }

    /// Override the axis position without motion.
    ///
    /// On rotary hardware `value` is an absolute spool angle in degrees;
    /// otherwise it is a linear position in mm.
    pub fn set_position(&mut self, value: f32) {
        if self.config.rotary_feed {
            let mut angle = value;
            if angle < 0.0 {
                angle += FULL_CYCLE_DEG;
            }
            self.tracker.set_previous_angle(Degrees(angle));
            self.current_angle = angle;
            self.target_angle = angle;
            self.current_position = self.geometry.angle_to_mm(angle);
            self.target_position = self.current_position;
        } else {
            self.current_position = value;
            self.target_position = value;
        }
        self.unstepped_distance = 0.0;
        self.limiter.set_position(value);
    }

    /// Snapshot position and mode, as around state-sensitive queue
    /// operations.
    pub fn save_state(&mut self) {
        self.saved = Some(SavedState {
            current_position: self.current_position,
            target_position: self.target_position,
            current_angle: self.current_angle,
            target_angle: self.target_angle,
            mode: self.mode,
        });
    }

    /// Restore the most recent snapshot; no-op when none was taken.
    pub fn restore_state(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.current_position = saved.current_position;
            self.target_position = saved.target_position;
            self.current_angle = saved.current_angle;
            self.target_angle = saved.target_angle;
            self.mode = saved.mode;
        }
    }

    /// Current axis position in mm of filament.
    pub fn current_position(&self) -> Millimeters {
        Millimeters(self.current_position)
    }

    /// Current steps-per-mm ratio.
    pub fn steps_per_mm(&self) -> f32 {
        self.geometry.steps_per_mm
    }

    /// Replace the steps-per-mm ratio.
    pub fn set_steps_per_mm(&mut self, steps_per_mm: f32) {
        self.geometry.set_steps_per_mm(steps_per_mm);
    }

    /// Configured filament diameter in mm.
    pub fn filament_diameter(&self) -> Millimeters {
        Millimeters(self.geometry.filament_diameter)
    }

    /// Replace the filament diameter and rederive the volumetric
    /// multiplier.
    ///
    /// Drains the queue first; changing the feed scaling under in-flight
    /// motion would corrupt the position accounting.
    pub fn set_filament_diameter<Q: BlockQueue>(&mut self, queue: &mut Q, diameter: Millimeters) {
        queue.wait_for_empty();
        self.geometry.set_filament_diameter(diameter.value());
    }

    /// Maximum linear rate in mm/s; 0 means uncapped.
    pub fn max_rate(&self) -> MmPerSec {
        MmPerSec(self.actuator.max_rate())
    }

    /// Replace the maximum linear rate.
    pub fn set_max_rate(&mut self, rate: MmPerSec) {
        self.actuator.set_max_rate(rate.value());
    }

    /// Maximum volumetric rate in mm³/s; 0 means uncapped.
    pub fn max_volumetric_rate(&self) -> CubicMmPerSec {
        self.max_volumetric_rate
    }

    /// Replace the maximum volumetric rate.
    pub fn set_max_volumetric_rate(&mut self, rate: CubicMmPerSec) {
        self.max_volumetric_rate = rate;
    }

    /// Flow multiplier (1.0 = 100%).
    pub fn extruder_multiplier(&self) -> f32 {
        self.extruder_multiplier
    }

    /// Replace the flow multiplier; non-positive values are ignored.
    pub fn set_extruder_multiplier(&mut self, multiplier: f32) {
        if multiplier > 0.0 {
            self.extruder_multiplier = multiplier;
        }
    }

    /// Switch the rate-limit milestone between absolute and relative
    /// accounting, independent of enable state.
    pub fn set_milestone_absolute(&mut self, absolute: bool) {
        self.limiter.set_absolute(absolute);
    }

    /// Whether milestone accounting is absolute.
    pub fn milestone_absolute(&self) -> bool {
        self.limiter.is_absolute()
    }

    /// Solo acceleration in mm/s².
    pub fn acceleration(&self) -> f32 {
        self.scheduler.acceleration()
    }

    /// Replace the Solo acceleration.
    pub fn set_acceleration(&mut self, acceleration: f32) {
        self.scheduler.set_acceleration(acceleration);
    }

    /// Current Solo feed rate in mm/s.
    pub fn feed_rate(&self) -> MmPerSec {
        MmPerSec(self.feed_rate)
    }

    /// Configured tool offsets relative to the primary axes.
    pub fn offsets(&self) -> &AxisOffsets {
        &self.config.offset
    }

    /// The retract parameters.
    pub fn retract_config(&self) -> &RetractConfig {
        self.retract.config()
    }

    /// Mutable retract parameters for runtime setting edits.
    pub fn retract_config_mut(&mut self) -> &mut RetractConfig {
        self.retract.config_mut()
    }

    /// Append the axis position to a status report.
    pub fn position_report<W: Write>(&self, out: &mut W) -> fmt::Result {
        write!(out, " E:{:.3}", self.current_position)
    }

    /// Append the current settings to a configuration report.
    pub fn settings_report<W: Write>(&self, out: &mut W) -> fmt::Result {
        if self.geometry.is_volumetric() {
            writeln!(
                out,
                "{}: steps per mm {:.4}, filament diameter {:.3} mm",
                self.config.name, self.geometry.steps_per_mm, self.geometry.filament_diameter
            )?;
        } else {
            writeln!(
                out,
                "{}: steps per mm {:.4}, volumetric extrusion disabled",
                self.config.name, self.geometry.steps_per_mm
            )?;
        }
        write!(
            out,
            "  acceleration {:.1} mm/s^2, max rate {:.1} mm/s",
            self.scheduler.acceleration(),
            self.actuator.max_rate()
        )?;
        if self.max_volumetric_rate.value() > 0.0 {
            write!(
                out,
                ", max volumetric rate {:.1} mm^3/s",
                self.max_volumetric_rate.value()
            )?;
        }
        writeln!(out)?;
        let retract = self.retract.config();
        writeln!(
            out,
            "  retract {:.2} mm at {:.1} mm/s, recover extra {:.2} mm at {:.1} mm/s, zlift {:.2} mm at {:.1} mm/s",
            retract.length.value(),
            retract.feed_rate.value(),
            retract.recover_length.value(),
            retract.recover_feed_rate.value(),
            retract.zlift_length.value(),
            retract.zlift_feed_rate.value()
        )
    }

    fn release_held<Q: BlockQueue>(&mut self, queue: &mut Q) {
        if let Some(held) = self.held.take() {
            queue.release(held.handle);
        }
    }

    fn apply_follow_rate(&mut self, primary_steps_per_sec: f32) {
        if let Some(held) = &self.held {
            if held.total_steps > 0 {
                let fraction = held.steps_to_move as f32 / held.total_steps as f32;
                self.actuator
                    .set_step_rate((primary_steps_per_sec * fraction) as u32);
            }
        }
    }
}

impl<A, S> MotionEvents for AxisController<A, S>
where
    A: StepActuator,
    S: AngleSensor,
{
    fn on_block_begin<Q: BlockQueue>(&mut self, queue: &mut Q, block: &PlannedBlock) {
        if !self.enabled {
            return;
        }

        if self.mode == AxisMode::Off {
            self.release_held(queue);
            self.actuator.set_moved_last_block(false);
            return;
        }

        let travel = match self.mode {
            AxisMode::Solo => self.travel_distance,
            AxisMode::Follow => self.travel_ratio * block.travel_mm,
            AxisMode::Off => return,
        };
        self.travel_distance = travel;

        self.current_position += travel;
        self.current_angle += self.geometry.mm_to_angle(travel);
        if self.current_angle > FULL_CYCLE_DEG {
            // Wrap and resynchronize the linear position from the angle so
            // the two stay consistent on rotary hardware.
            self.current_angle -= FULL_CYCLE_DEG;
            self.current_position = self.geometry.angle_to_mm(self.current_angle);
        }

        let steps_per_mm = self.geometry.steps_per_mm;
        let raw = floorf(steps_per_mm * (travel + self.unstepped_distance));
        let steps = (raw as i32).unsigned_abs();

        // Carry the sub-step remainder, signed so the position error stays
        // bounded rather than drifting.
        if travel > 0.0 {
            self.unstepped_distance += travel - steps as f32 / steps_per_mm;
        } else {
            self.unstepped_distance += travel + steps as f32 / steps_per_mm;
        }

        if steps == 0 {
            self.actuator.set_moved_last_block(false);
            return;
        }

        queue.take(block.handle);
        self.held = Some(HeldBlock {
            handle: block.handle,
            steps_to_move: steps,
            total_steps: block.total_steps,
        });
        self.actuator.move_steps(travel > 0.0, steps);

        match self.mode {
            AxisMode::Follow => {
                self.actuator.set_moved_last_block(true);
                self.apply_follow_rate(block.nominal_rate);
            }
            AxisMode::Solo => {
                let target = self.scheduler.target_rate(self.feed_rate, steps_per_mm);
                let first = self.scheduler.rate_increment(steps_per_mm);
                self.actuator.set_step_rate(target.min(first));
                self.actuator.set_moved_last_block(false);
            }
            AxisMode::Off => {}
        }
    }

    fn on_block_end(&mut self) {
        if !self.enabled {
            return;
        }
        // The reference count is returned by on_actuator_finished, which
        // runs before the queue delivers block-end.
        self.held = None;
    }

    fn on_speed_change<Q: BlockQueue>(&mut self, queue: &mut Q, steps_per_sec: Option<f32>) {
        if !self.enabled || self.mode != AxisMode::Follow || self.held.is_none() {
            return;
        }
        if !self.actuator.is_moving() {
            return;
        }

        match steps_per_sec {
            None => {
                // Queue flush: stop now and give the block back.
                self.actuator.stop();
                self.release_held(queue);
            }
            Some(rate) => self.apply_follow_rate(rate),
        }
    }

    fn on_tick(&mut self) {
        if !self.enabled || self.mode != AxisMode::Solo || self.held.is_none() {
            return;
        }
        if !self.actuator.is_moving() {
            return;
        }

        let current = self.actuator.step_rate();
        let next = self
            .scheduler
            .next_rate(current, self.feed_rate, self.geometry.steps_per_mm);
        if next > current {
            self.actuator.set_step_rate(next);
        }
    }

    fn on_actuator_finished<Q: BlockQueue>(&mut self, queue: &mut Q) {
        // A finish with no held block is a benign race, not an error.
        self.release_held(queue);
    }
}
