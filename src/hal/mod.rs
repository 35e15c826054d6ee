//! Hardware and collaborator seams.
//!
//! The axis controller drives a step actuator, reads an angle sensor during
//! homing, and talks to the external motion queue through narrow traits so
//! firmware glue (or tests) can supply any implementation. The bundled
//! [`PulseStepper`] implements [`StepActuator`] over embedded-hal 1.0 pins.

mod pulse;

pub use pulse::PulseStepper;

use core::sync::atomic::{AtomicBool, Ordering};

use crate::command::AxisCommand;

/// Handle to a planner-owned motion block.
///
/// Blocks live in the external queue's arena; the axis only ever holds a
/// handle, bounded between block-begin and release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHandle(pub usize);

/// The planner-facing view of one block of coordinated motion.
#[derive(Debug, Clone, Copy)]
pub struct PlannedBlock {
    /// Arena handle for take/release accounting.
    pub handle: BlockHandle,

    /// Total step count of the primary trajectory for this block.
    pub total_steps: u32,

    /// Nominal step rate of the primary trajectory in steps/s.
    pub nominal_rate: f32,

    /// Total linear length of the block on the other axes, in mm.
    pub travel_mm: f32,
}

/// Driver for the axis step actuator.
///
/// Rates are in steps per second except [`max_rate`](Self::max_rate), which
/// is the configured linear cap in mm/s (0 disables the cap).
pub trait StepActuator {
    /// Energize or release the motor.
    fn enable(&mut self, enabled: bool);

    /// Start a move of `steps` steps in the given direction.
    fn move_steps(&mut self, forward: bool, steps: u32);

    /// Abort any move in progress.
    fn stop(&mut self);

    /// Set the current step rate in steps/s.
    fn set_step_rate(&mut self, steps_per_sec: u32);

    /// Current step rate in steps/s.
    fn step_rate(&self) -> u32;

    /// Whether a commanded move is still in progress.
    fn is_moving(&self) -> bool;

    /// Configured maximum linear rate in mm/s; 0 means uncapped.
    fn max_rate(&self) -> f32;

    /// Replace the maximum linear rate.
    fn set_max_rate(&mut self, mm_per_sec: f32);

    /// Record whether the axis stepped during the last block.
    fn set_moved_last_block(&mut self, moved: bool);
}

/// Rotary-angle analog sensor, used only during homing.
pub trait AngleSensor {
    /// Read one calibrated raw sample correlated with rotary position.
    fn raw_value(&mut self) -> i32;
}

/// Block reference operations on the external motion queue.
///
/// Every successful `take` must be matched by exactly one later `release`.
pub trait BlockQueue {
    /// Take a reference on a block, keeping it alive past its end event.
    fn take(&mut self, block: BlockHandle);

    /// Return a previously taken reference.
    fn release(&mut self, block: BlockHandle);

    /// Queue an empty exclusive block so later commands cannot overlap the
    /// move currently being submitted.
    fn queue_exclusive_block(&mut self);

    /// Block until all queued motion has drained.
    fn wait_for_empty(&mut self);
}

/// The external motion-command entry point, used recursively for the small
/// synthetic moves the retract sequence generates.
pub trait CommandSink {
    /// Save the global motion state (positioning mode, feed rates).
    fn push_state(&mut self);

    /// Restore the most recently saved global motion state.
    fn pop_state(&mut self);

    /// Force relative positioning for the next submitted command.
    fn set_relative_mode(&mut self);

    /// Submit a command for normal processing.
    fn submit(&mut self, command: &AxisCommand);
}

/// Global halt condition, polled during blocking sequences.
pub trait HaltFlag {
    /// Whether the system has been halted.
    fn is_halted(&self) -> bool;
}

impl HaltFlag for AtomicBool {
    fn is_halted(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}
