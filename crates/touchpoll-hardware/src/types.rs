//! Types published to the host input subsystem at registration.

use crate::config::TouchscreenConfig;
use crate::properties::TouchscreenProperties;
use serde::{Deserialize, Serialize};
use touchpoll_core::constants::MAX_SLOTS;

/// Bus the controller is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum BusType {
    I2c,
    Virtual,
}

impl BusType {
    /// Linux `BUS_*` identifier.
    pub fn as_raw(&self) -> u16 {
        match self {
            Self::I2c => ::evdev::BusType::BUS_I2C.0,
            Self::Virtual => ::evdev::BusType::BUS_VIRTUAL.0,
        }
    }
}

/// Range of an absolute axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsAxis {
    pub min: i32,
    pub max: i32,
}

impl AbsAxis {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }
}

/// Capabilities of the registered input device.
///
/// Built once from the configuration. The multi-touch axes are swapped when
/// the panel is rotated, so consumers always see the reported orientation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Input device name.
    pub name: String,

    /// Bus the controller sits on.
    pub bus_type: BusType,

    /// Range of `ABS_MT_POSITION_X`.
    pub position_x: AbsAxis,

    /// Range of `ABS_MT_POSITION_Y`.
    pub position_y: AbsAxis,

    /// Number of multi-touch slots.
    pub max_slots: usize,

    /// Touchscreen (direct) rather than touchpad input.
    pub direct: bool,

    /// Poll period in milliseconds.
    pub poll_interval_ms: u64,
}

impl DeviceDescriptor {
    /// Describe the device a configuration registers.
    ///
    /// # Examples
    ///
    /// ```
    /// use touchpoll_hardware::config::TouchscreenConfig;
    /// use touchpoll_hardware::types::DeviceDescriptor;
    ///
    /// let descriptor = DeviceDescriptor::from_config(&TouchscreenConfig::default());
    /// assert_eq!(descriptor.position_x.max, 800);
    /// assert_eq!(descriptor.max_slots, 10);
    /// ```
    pub fn from_config(config: &TouchscreenConfig) -> Self {
        let (max_x, max_y) = TouchscreenProperties::from_config(config).reported_max();
        Self {
            name: config.name.clone(),
            bus_type: BusType::I2c,
            position_x: AbsAxis::new(0, i32::from(max_x)),
            position_y: AbsAxis::new(0, i32::from(max_y)),
            max_slots: MAX_SLOTS,
            direct: true,
            poll_interval_ms: config.poll_interval_ms,
        }
    }

    pub fn with_bus_type(mut self, bus_type: BusType) -> Self {
        self.bus_type = bus_type;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_defaults() {
        let descriptor = DeviceDescriptor::from_config(&TouchscreenConfig::default());

        assert_eq!(descriptor.name, "raspberrypi-i2c-ts");
        assert_eq!(descriptor.bus_type, BusType::I2c);
        assert_eq!(descriptor.position_x, AbsAxis::new(0, 800));
        assert_eq!(descriptor.position_y, AbsAxis::new(0, 480));
        assert!(descriptor.direct);
        assert_eq!(descriptor.poll_interval_ms, 17);
    }

    #[test]
    fn test_descriptor_swapped_axes() {
        let mut config = TouchscreenConfig::default();
        config.properties.swapped_x_y = true;

        let descriptor = DeviceDescriptor::from_config(&config);
        assert_eq!(descriptor.position_x.max, 480);
        assert_eq!(descriptor.position_y.max, 800);
    }

    #[test]
    fn test_bus_type_raw() {
        assert_eq!(BusType::I2c.as_raw(), 0x18);
        let descriptor = DeviceDescriptor::from_config(&TouchscreenConfig::default())
            .with_bus_type(BusType::Virtual);
        assert_eq!(descriptor.bus_type.as_raw(), 0x06);
    }

    #[test]
    fn test_descriptor_serialization() {
        let descriptor = DeviceDescriptor::from_config(&TouchscreenConfig::default());
        let json = serde_json::to_string(&descriptor).unwrap();
        let parsed: DeviceDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, descriptor);
    }
}
