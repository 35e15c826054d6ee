//! Configuration module for extruder-motion.
//!
//! Provides types for loading and validating the filament-axis configuration
//! from TOML files (with `std` feature) or pre-parsed data.

mod axis;
mod geometry;
#[cfg(feature = "std")]
mod loader;
pub mod units;
mod validation;

pub use axis::{AxisConfig, AxisOffsets, HomingConfig, RetractConfig};
pub use geometry::AxisGeometry;
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{CubicMmPerSec, Degrees, Millimeters, MmPerSec};
