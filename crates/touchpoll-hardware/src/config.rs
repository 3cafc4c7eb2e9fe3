//! Touchscreen configuration.
//!
//! Every field has a default, so an empty JSON object is a valid configuration:
//!
//! ```
//! use touchpoll_hardware::config::TouchscreenConfig;
//!
//! let config = TouchscreenConfig::from_json_str("{}").unwrap();
//! assert_eq!(config, TouchscreenConfig::default());
//! assert_eq!(config.poll_interval_ms, 17);
//! ```
//!
//! Orientation overrides use the device-tree property names:
//!
//! ```
//! use touchpoll_hardware::config::TouchscreenConfig;
//!
//! let config = TouchscreenConfig::from_json_str(r#"{
//!     "properties": {
//!         "touchscreen-size-x": 1024,
//!         "touchscreen-inverted-y": true
//!     }
//! }"#).unwrap();
//!
//! assert_eq!(config.properties.size_x, Some(1024));
//! assert!(config.properties.inverted_y);
//! ```

use crate::error::{HardwareError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use touchpoll_core::constants::{
    DEFAULT_HEIGHT, DEFAULT_I2C_ADDRESS, DEFAULT_WIDTH, DEVICE_NAME, MAX_COORDINATE,
    POLL_INTERVAL_MS,
};

/// Default capacity of the frame channel between the poller and its consumer.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Largest 7-bit I2C address.
const MAX_I2C_ADDRESS: u8 = 0x7F;

/// Orientation and size overrides, named after the touchscreen device-tree
/// bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyOverrides {
    /// Horizontal resolution of the panel.
    #[serde(rename = "touchscreen-size-x", skip_serializing_if = "Option::is_none")]
    pub size_x: Option<u16>,

    /// Vertical resolution of the panel.
    #[serde(rename = "touchscreen-size-y", skip_serializing_if = "Option::is_none")]
    pub size_y: Option<u16>,

    /// Mirror the X axis.
    #[serde(rename = "touchscreen-inverted-x")]
    pub inverted_x: bool,

    /// Mirror the Y axis.
    #[serde(rename = "touchscreen-inverted-y")]
    pub inverted_y: bool,

    /// Exchange the X and Y axes (applied after inversion).
    #[serde(rename = "touchscreen-swapped-x-y")]
    pub swapped_x_y: bool,
}

/// Configuration of one touch controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchscreenConfig {
    /// Input device name.
    pub name: String,

    /// 7-bit I2C address of the controller.
    pub i2c_address: u8,

    /// Reporting width used when `touchscreen-size-x` is absent.
    pub default_width: u16,

    /// Reporting height used when `touchscreen-size-y` is absent.
    pub default_height: u16,

    /// Poll period in milliseconds.
    pub poll_interval_ms: u64,

    /// Frames buffered between the poller and its consumer.
    pub channel_capacity: usize,

    /// Orientation and size overrides.
    pub properties: PropertyOverrides,
}

impl Default for TouchscreenConfig {
    fn default() -> Self {
        Self {
            name: DEVICE_NAME.to_string(),
            i2c_address: DEFAULT_I2C_ADDRESS,
            default_width: DEFAULT_WIDTH,
            default_height: DEFAULT_HEIGHT,
            poll_interval_ms: POLL_INTERVAL_MS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            properties: PropertyOverrides::default(),
        }
    }
}

impl TouchscreenConfig {
    /// Parse a configuration from JSON and validate it.
    ///
    /// # Errors
    ///
    /// Returns a setup failure if the JSON is malformed or a value is out of range.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns a setup failure if the file cannot be read or is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Poll period as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Check every value against the ranges the controller and input layer accept.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::ConfigurationError` describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(HardwareError::configuration("device name must not be empty"));
        }
        if self.i2c_address > MAX_I2C_ADDRESS {
            return Err(HardwareError::configuration(format!(
                "I2C address must be 7-bit, got {:#04x}",
                self.i2c_address
            )));
        }
        for (axis, value) in [("width", self.default_width), ("height", self.default_height)] {
            if value == 0 || value > MAX_COORDINATE {
                return Err(HardwareError::configuration(format!(
                    "default {axis} must be 1-{MAX_COORDINATE}, got {value}"
                )));
            }
        }
        for (axis, size) in [("x", self.properties.size_x), ("y", self.properties.size_y)] {
            if let Some(size) = size
                && (size == 0 || size > MAX_COORDINATE + 1)
            {
                return Err(HardwareError::configuration(format!(
                    "touchscreen-size-{axis} must be 1-{}, got {size}",
                    MAX_COORDINATE + 1
                )));
            }
        }
        if self.poll_interval_ms == 0 {
            return Err(HardwareError::configuration(
                "poll interval must be non-zero",
            ));
        }
        if self.channel_capacity == 0 {
            return Err(HardwareError::configuration(
                "channel capacity must be non-zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_default_config() {
        let config = TouchscreenConfig::default();
        assert_eq!(config.name, "raspberrypi-i2c-ts");
        assert_eq!(config.i2c_address, 0x38);
        assert_eq!(config.default_width, 800);
        assert_eq!(config.default_height, 480);
        assert_eq!(config.poll_interval(), Duration::from_millis(17));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config =
            TouchscreenConfig::from_json_str(r#"{"poll_interval_ms": 10, "name": "panel"}"#)
                .unwrap();
        assert_eq!(config.poll_interval_ms, 10);
        assert_eq!(config.name, "panel");
        assert_eq!(config.default_width, 800);
    }

    #[test]
    fn test_properties_json_keys() {
        let config = TouchscreenConfig::from_json_str(
            r#"{"properties": {"touchscreen-swapped-x-y": true, "touchscreen-inverted-x": true}}"#,
        )
        .unwrap();
        assert!(config.properties.swapped_x_y);
        assert!(config.properties.inverted_x);
        assert!(!config.properties.inverted_y);
        assert_eq!(config.properties.size_x, None);
    }

    #[test]
    fn test_serialize_roundtrip() {
        let mut config = TouchscreenConfig::default();
        config.properties.size_y = Some(600);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("touchscreen-size-y"));
        assert!(!json.contains("touchscreen-size-x"));

        let parsed = TouchscreenConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_malformed_json() {
        let error = TouchscreenConfig::from_json_str("{").unwrap_err();
        assert!(matches!(error, HardwareError::ConfigParse(_)));
        assert_eq!(error.kind(), ErrorKind::SetupFailure);
    }

    #[test]
    fn test_validation_failures() {
        let cases = [
            r#"{"poll_interval_ms": 0}"#,
            r#"{"default_width": 0}"#,
            r#"{"default_height": 5000}"#,
            r#"{"i2c_address": 128}"#,
            r#"{"channel_capacity": 0}"#,
            r#"{"name": "  "}"#,
            r#"{"properties": {"touchscreen-size-x": 0}}"#,
            r#"{"properties": {"touchscreen-size-y": 4097}}"#,
        ];

        for json in cases {
            let error = TouchscreenConfig::from_json_str(json).unwrap_err();
            assert!(
                matches!(error, HardwareError::ConfigurationError { .. }),
                "{json} should be rejected, got {error:?}"
            );
        }
    }

    #[test]
    fn test_missing_file() {
        let error = TouchscreenConfig::from_file("/nonexistent/touchpoll.json").unwrap_err();
        assert!(matches!(error, HardwareError::Io(_)));
    }
}
