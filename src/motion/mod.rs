//! Rate and position math for the feed axis.
//!
//! These components are pure state machines over numbers; they know nothing
//! about the actuator or the block queue. The axis controller composes them
//! and wires their outputs to the hardware seams.

mod accel;
mod rate;
mod rotary;

pub use accel::AccelerationScheduler;
pub use rate::RateLimiter;
pub use rotary::{RotaryPositionTracker, FULL_CYCLE_DEG};
