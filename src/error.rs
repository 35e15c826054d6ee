//! Error types for the extruder-motion library.
//!
//! Provides unified error handling across configuration, actuator access, and homing.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all extruder-motion operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Step actuator hardware error
    Actuator(ActuatorError),
    /// Homing sweep error
    Homing(HomingError),
}

/// Configuration-related errors.
///
/// Zero step ratios are rejected here, at load time: they would become
/// division operands in the position/angle conversions.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// steps_per_mm must be a positive finite number
    InvalidStepsPerMm(f32),
    /// steps_per_angle must be a positive finite number
    InvalidStepsPerAngle(f32),
    /// Filament diameter must be >= 0 (0 disables volumetric mode)
    InvalidFilamentDiameter(f32),
    /// Acceleration must be > 0
    InvalidAcceleration(f32),
    /// A feed rate must be > 0
    InvalidFeedRate(f32),
    /// A retract length must be >= 0
    InvalidRetractLength(f32),
    /// Homing search increment must be within the valid band
    InvalidSearchIncrement {
        /// Configured increment in degrees
        increment: f32,
        /// Minimum accepted increment in degrees
        minimum: f32,
    },
    /// Homing search rate must be > 0
    InvalidSearchRate(u32),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Step actuator errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// Pin operation failed
    PinError,
}

/// Homing sweep errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomingError {
    /// The global halt flag was raised during the sweep.
    ///
    /// The axis is left wherever it stopped, uncalibrated; the caller must
    /// re-run the sweep before relying on the zero reference.
    Halted,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Actuator(e) => write!(f, "Actuator error: {}", e),
            Error::Homing(e) => write!(f, "Homing error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidStepsPerMm(v) => {
                write!(f, "Invalid steps_per_mm: {}. Must be > 0", v)
            }
            ConfigError::InvalidStepsPerAngle(v) => {
                write!(f, "Invalid steps_per_angle: {}. Must be > 0", v)
            }
            ConfigError::InvalidFilamentDiameter(v) => {
                write!(f, "Invalid filament diameter: {}. Must be >= 0", v)
            }
            ConfigError::InvalidAcceleration(v) => {
                write!(f, "Invalid acceleration: {}. Must be > 0", v)
            }
            ConfigError::InvalidFeedRate(v) => write!(f, "Invalid feed rate: {}. Must be > 0", v),
            ConfigError::InvalidRetractLength(v) => {
                write!(f, "Invalid retract length: {}. Must be >= 0", v)
            }
            ConfigError::InvalidSearchIncrement { increment, minimum } => {
                write!(
                    f,
                    "Invalid homing search increment: {}. Must be in [{}, 360]",
                    increment, minimum
                )
            }
            ConfigError::InvalidSearchRate(v) => {
                write!(f, "Invalid homing search rate: {}. Must be > 0", v)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActuatorError::PinError => write!(f, "GPIO pin operation failed"),
        }
    }
}

impl fmt::Display for HomingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HomingError::Halted => write!(f, "Homing sweep halted, axis uncalibrated"),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Error::Actuator(e)
    }
}

impl From<HomingError> for Error {
    fn from(e: HomingError) -> Self {
        Error::Homing(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for ActuatorError {}

#[cfg(feature = "std")]
impl std::error::Error for HomingError {}
