//! The feed-axis state machine and its sub-sequencers.

mod controller;
mod homing;
mod retract;

pub use controller::{AxisController, AxisMode, MotionEvents};
pub use homing::HomingSequencer;
pub use retract::RetractController;
