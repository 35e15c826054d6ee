//! Derived axis geometry computed from configuration.

use core::f32::consts::PI;

use libm::powf;

use super::axis::AxisConfig;

/// Filament diameters at or below this are treated as "no diameter
/// configured" (volumetric mode off).
const MIN_FILAMENT_DIAMETER: f32 = 0.01;

/// Derived geometric parameters for the feed axis.
///
/// Computed once from [`AxisConfig`] and then runtime-adjustable (the
/// steps-per-mm and filament-diameter settings can be edited live).
#[derive(Debug, Clone)]
pub struct AxisGeometry {
    /// Steps per millimeter of filament travel.
    pub steps_per_mm: f32,

    /// Steps per degree of feed-wheel rotation.
    pub steps_per_angle: f32,

    /// Filament diameter in millimeters (0 = volumetric mode off).
    pub filament_diameter: f32,

    /// Converts mm³ of extruded volume to mm of filament; 1.0 when
    /// volumetric mode is off.
    pub volumetric_multiplier: f32,
}

impl AxisGeometry {
    /// Compute geometry from axis configuration.
    pub fn from_config(config: &AxisConfig) -> Self {
        let mut geometry = Self {
            steps_per_mm: config.steps_per_mm,
            steps_per_angle: config.steps_per_angle,
            filament_diameter: 0.0,
            volumetric_multiplier: 1.0,
        };
        geometry.set_filament_diameter(config.filament_diameter.value());
        geometry
    }

    /// Whether volumetric mode is active (filament diameter configured).
    #[inline]
    pub fn is_volumetric(&self) -> bool {
        self.filament_diameter > MIN_FILAMENT_DIAMETER
    }

    /// Convert a feed-wheel angle in degrees to linear filament travel in mm.
    #[inline]
    pub fn angle_to_mm(&self, angle: f32) -> f32 {
        (angle * self.steps_per_angle) / self.steps_per_mm
    }

    /// Convert linear filament travel in mm to a feed-wheel angle in degrees.
    #[inline]
    pub fn mm_to_angle(&self, mm: f32) -> f32 {
        (mm * self.steps_per_mm) / self.steps_per_angle
    }

    /// Replace the steps-per-mm ratio (runtime setting edit).
    #[inline]
    pub fn set_steps_per_mm(&mut self, steps_per_mm: f32) {
        self.steps_per_mm = steps_per_mm;
    }

    /// Replace the filament diameter and rederive the volumetric multiplier.
    pub fn set_filament_diameter(&mut self, diameter: f32) {
        self.filament_diameter = diameter;
        self.volumetric_multiplier = if diameter > MIN_FILAMENT_DIAMETER {
            1.0 / (powf(diameter / 2.0, 2.0) * PI)
        } else {
            1.0
        };
    }
}
