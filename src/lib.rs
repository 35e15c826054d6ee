//! # extruder-motion
//!
//! Motion control for a single filament-feed axis in 3D printer firmware,
//! with embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Solo / Follow arbitration**: the axis either steps on its own with a
//!   linear acceleration ramp, or slaves its step rate to the primary
//!   trajectory's instantaneous rate via a fixed distance ratio
//! - **Rate limiting**: volumetric flow (from filament geometry) and linear
//!   speed caps, returned as a rate multiplier for the whole move
//! - **Firmware retract**: idempotent retract/recover sequence with optional
//!   Z-hop, serialized against the command queue
//! - **Rotary feed tracking**: shortest-path angle optimization and
//!   wraparound handling for rotary feed hardware
//! - **Sensor-guided homing**: full-cycle sweep selecting the strongest
//!   angle-sensor sample as the zero reference
//! - **no_std compatible**: core library works without the standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use extruder_motion::{AxisCommand, AxisController, MotionEvents};
//!
//! // Load configuration from TOML
//! let config = extruder_motion::load_config("extruder.toml")?;
//!
//! // Bind the axis to its actuator and angle sensor
//! let mut axis = AxisController::new(config, actuator, sensor)?;
//! axis.set_enabled(true);
//!
//! // Command processing context
//! axis.on_command(&AxisCommand::solo_feed(5.0, true));
//!
//! // Block lifecycle, driven by the external motion queue
//! axis.on_block_begin(&mut queue, &block);
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `alloc`: Enables heap allocation for no_std with allocator
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Core modules
pub mod axis;
pub mod command;
pub mod config;
pub mod error;
pub mod hal;
pub mod motion;

// Re-exports for ergonomic API
pub use axis::{AxisController, AxisMode, HomingSequencer, MotionEvents, RetractController};
pub use command::AxisCommand;
pub use config::{validate_config, AxisConfig, AxisGeometry, HomingConfig, RetractConfig};
pub use error::{Error, Result};
pub use hal::{
    AngleSensor, BlockHandle, BlockQueue, CommandSink, HaltFlag, PlannedBlock, PulseStepper,
    StepActuator,
};
pub use motion::{AccelerationScheduler, RateLimiter, RotaryPositionTracker};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::load_config;

// Unit types
pub use config::units::{CubicMmPerSec, Degrees, Millimeters, MmPerSec};
