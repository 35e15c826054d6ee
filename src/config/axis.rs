//! Axis configuration from TOML.

use heapless::String;
use serde::Deserialize;

use super::units::{Degrees, Millimeters, MmPerSec};

/// Complete filament-axis configuration from TOML.
///
/// Immutable after a (re)load; runtime-adjustable values are copied into
/// the controller and its derived [`AxisGeometry`](super::AxisGeometry).
#[derive(Debug, Clone, Deserialize)]
pub struct AxisConfig {
    /// Human-readable name (max 32 chars).
    #[serde(default = "default_name")]
    pub name: String<32>,

    /// Steps per millimeter of filament travel. Must be > 0.
    pub steps_per_mm: f32,

    /// Steps per degree of feed-wheel rotation. Must be > 0.
    pub steps_per_angle: f32,

    /// Filament diameter in millimeters; 0 disables volumetric mode.
    #[serde(default, rename = "filament_diameter_mm")]
    pub filament_diameter: Millimeters,

    /// Acceleration for Solo moves in mm/s².
    #[serde(default = "default_acceleration", rename = "acceleration_mm_per_sec2")]
    pub acceleration: f32,

    /// Default Solo feed rate in mm/s, until a command overrides it.
    #[serde(default = "default_feed_rate", rename = "default_feed_rate_mm_per_sec")]
    pub default_feed_rate: MmPerSec,

    /// Maximum linear rate in mm/s; 0 disables the cap.
    #[serde(default = "default_max_rate", rename = "max_rate_mm_per_sec")]
    pub max_rate: MmPerSec,

    /// Interpret Solo feed targets as absolute spool angles instead of
    /// linear filament lengths (rotary feed hardware).
    #[serde(default)]
    pub rotary_feed: bool,

    /// Rate of the periodic acceleration tick driving the Solo ramp.
    #[serde(default = "default_accel_ticks")]
    pub acceleration_ticks_per_second: f32,

    /// Tool offsets relative to the primary axes.
    #[serde(default)]
    pub offset: AxisOffsets,

    /// Firmware retract parameters.
    #[serde(default)]
    pub retract: RetractConfig,

    /// Sensor-guided homing parameters.
    #[serde(default)]
    pub homing: HomingConfig,
}

/// Per-axis tool offsets in millimeters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AxisOffsets {
    /// X offset.
    #[serde(default, rename = "x_mm")]
    pub x: Millimeters,
    /// Y offset.
    #[serde(default, rename = "y_mm")]
    pub y: Millimeters,
    /// Z offset.
    #[serde(default, rename = "z_mm")]
    pub z: Millimeters,
}

/// Firmware retract/recover parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct RetractConfig {
    /// Filament length withdrawn on retract, in millimeters.
    #[serde(default = "default_retract_length", rename = "length_mm")]
    pub length: Millimeters,

    /// Retract move feed rate in mm/s.
    #[serde(default = "default_retract_feed_rate", rename = "feed_rate_mm_per_sec")]
    pub feed_rate: MmPerSec,

    /// Extra length fed back on recover, on top of the retract length.
    #[serde(default, rename = "recover_length_mm")]
    pub recover_length: Millimeters,

    /// Recover move feed rate in mm/s.
    #[serde(
        default = "default_recover_feed_rate",
        rename = "recover_feed_rate_mm_per_sec"
    )]
    pub recover_feed_rate: MmPerSec,

    /// Vertical hop around the retract pair; 0 disables the hop.
    #[serde(default, rename = "zlift_length_mm")]
    pub zlift_length: Millimeters,

    /// Feed rate of the hop moves in mm/s.
    #[serde(
        default = "default_zlift_feed_rate",
        rename = "zlift_feed_rate_mm_per_sec"
    )]
    pub zlift_feed_rate: MmPerSec,
}

impl Default for RetractConfig {
    fn default() -> Self {
        Self {
            length: default_retract_length(),
            feed_rate: default_retract_feed_rate(),
            recover_length: Millimeters(0.0),
            recover_feed_rate: default_recover_feed_rate(),
            zlift_length: Millimeters(0.0),
            zlift_feed_rate: default_zlift_feed_rate(),
        }
    }
}

/// Sensor-guided homing parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct HomingConfig {
    /// Fixed step rate during the search sweep, in steps/s.
    #[serde(default = "default_search_rate", rename = "search_rate_steps_per_sec")]
    pub search_rate: u32,

    /// Angular increment between sensor samples, in degrees.
    #[serde(default = "default_search_increment", rename = "search_increment_deg")]
    pub search_increment: Degrees,
}

impl HomingConfig {
    /// Smallest accepted search increment, bounding the sample buffer.
    pub const MIN_SEARCH_INCREMENT_DEG: f32 = 3.0;
}

impl Default for HomingConfig {
    fn default() -> Self {
        Self {
            search_rate: default_search_rate(),
            search_increment: default_search_increment(),
        }
    }
}

fn default_name() -> String<32> {
    String::try_from("extruder").unwrap_or_default()
}

fn default_acceleration() -> f32 {
    1000.0
}

fn default_feed_rate() -> MmPerSec {
    MmPerSec(1000.0)
}

fn default_max_rate() -> MmPerSec {
    MmPerSec(1000.0)
}

fn default_accel_ticks() -> f32 {
    1000.0
}

fn default_retract_length() -> Millimeters {
    Millimeters(3.0)
}

fn default_retract_feed_rate() -> MmPerSec {
    MmPerSec(45.0)
}

fn default_recover_feed_rate() -> MmPerSec {
    MmPerSec(8.0)
}

fn default_zlift_feed_rate() -> MmPerSec {
    MmPerSec(100.0)
}

fn default_search_rate() -> u32 {
    10_000
}

fn default_search_increment() -> Degrees {
    Degrees(10.0)
}
