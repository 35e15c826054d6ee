//! Configuration loading from files (std only).

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error, Result};

use super::AxisConfig;

/// Load axis configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
///
/// ```rust,ignore
/// use extruder_motion::load_config;
///
/// let config = load_config("extruder.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AxisConfig> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| {
        let msg = heapless::String::try_from(e.to_string().as_str()).unwrap_or_default();
        Error::Config(ConfigError::IoError(msg))
    })?;

    parse_config(&content)
}

/// Parse axis configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<AxisConfig> {
    let config: AxisConfig = toml::from_str(content).map_err(|e| {
        let msg = heapless::String::try_from(e.message()).unwrap_or_default();
        Error::Config(ConfigError::ParseError(msg))
    })?;

    // Validate the configuration
    super::validation::validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
steps_per_mm = 140.0
steps_per_angle = 10.0
"#;

        let config = parse_config(toml).unwrap();
        assert_eq!(config.name.as_str(), "extruder");
        assert_eq!(config.steps_per_mm, 140.0);
        assert_eq!(config.retract.length.value(), 3.0);
        assert!(!config.rotary_feed);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
name = "rotary_feed_0"
steps_per_mm = 10.0
steps_per_angle = 2.0
filament_diameter_mm = 1.75
acceleration_mm_per_sec2 = 500.0
default_feed_rate_mm_per_sec = 40.0
max_rate_mm_per_sec = 60.0
rotary_feed = true

[offset]
x_mm = 1.0
z_mm = -0.5

[retract]
length_mm = 2.0
feed_rate_mm_per_sec = 30.0
zlift_length_mm = 0.4

[homing]
search_rate_steps_per_sec = 8000
search_increment_deg = 5.0
"#;

        let config = parse_config(toml).unwrap();
        assert!(config.rotary_feed);
        assert_eq!(config.offset.z.value(), -0.5);
        assert_eq!(config.retract.zlift_length.value(), 0.4);
        assert_eq!(config.homing.search_rate, 8000);
    }

    #[test]
    fn test_missing_steps_per_mm_fails() {
        let toml = r#"
steps_per_angle = 10.0
"#;

        assert!(parse_config(toml).is_err());
    }

    #[test]
    fn test_invalid_config_rejected_at_parse() {
        let toml = r#"
steps_per_mm = 140.0
steps_per_angle = 10.0

[homing]
search_increment_deg = 0.5
"#;

        assert!(parse_config(toml).is_err());
    }
}
