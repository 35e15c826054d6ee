//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::axis::HomingConfig;
use super::AxisConfig;

/// Validate an axis configuration.
///
/// Checks:
/// - Step ratios are positive finite numbers (they divide elsewhere)
/// - Filament diameter is non-negative
/// - Acceleration, feed rates and the acceleration tick rate are positive
/// - Retract lengths are non-negative, retract feed rates positive
/// - Homing search rate and increment are in range
pub fn validate_config(config: &AxisConfig) -> Result<()> {
    validate_axis(config)?;
    validate_retract(config)?;
    validate_homing(config)?;
    Ok(())
}

fn validate_axis(config: &AxisConfig) -> Result<()> {
    if !config.steps_per_mm.is_finite() || config.steps_per_mm <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidStepsPerMm(
            config.steps_per_mm,
        )));
    }

    if !config.steps_per_angle.is_finite() || config.steps_per_angle <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidStepsPerAngle(
            config.steps_per_angle,
        )));
    }

    if !config.filament_diameter.value().is_finite() || config.filament_diameter.value() < 0.0 {
        return Err(Error::Config(ConfigError::InvalidFilamentDiameter(
            config.filament_diameter.value(),
        )));
    }

    if config.acceleration <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidAcceleration(
            config.acceleration,
        )));
    }

    if config.acceleration_ticks_per_second <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidAcceleration(
            config.acceleration_ticks_per_second,
        )));
    }

    if config.default_feed_rate.value() <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidFeedRate(
            config.default_feed_rate.value(),
        )));
    }

    // max_rate of 0 means "no cap", so only negatives are rejected
    if config.max_rate.value() < 0.0 {
        return Err(Error::Config(ConfigError::InvalidFeedRate(
            config.max_rate.value(),
        )));
    }

    Ok(())
}

fn validate_retract(config: &AxisConfig) -> Result<()> {
    let retract = &config.retract;

    for length in [
        retract.length.value(),
        retract.recover_length.value(),
        retract.zlift_length.value(),
    ] {
        if !length.is_finite() || length < 0.0 {
            return Err(Error::Config(ConfigError::InvalidRetractLength(length)));
        }
    }

    for rate in [
        retract.feed_rate.value(),
        retract.recover_feed_rate.value(),
        retract.zlift_feed_rate.value(),
    ] {
        if rate <= 0.0 {
            return Err(Error::Config(ConfigError::InvalidFeedRate(rate)));
        }
    }

    Ok(())
}

fn validate_homing(config: &AxisConfig) -> Result<()> {
    let homing = &config.homing;

    if homing.search_rate == 0 {
        return Err(Error::Config(ConfigError::InvalidSearchRate(
            homing.search_rate,
        )));
    }

    let increment = homing.search_increment.value();
    if !(HomingConfig::MIN_SEARCH_INCREMENT_DEG..=360.0).contains(&increment) {
        return Err(Error::Config(ConfigError::InvalidSearchIncrement {
            increment,
            minimum: HomingConfig::MIN_SEARCH_INCREMENT_DEG,
        }));
    }

    Ok(())
}
