//! Error types for touch controller operations.
//!
//! Errors fall into two kinds. Register reads that fail while polling are
//! transient: the cycle is abandoned and the next poll retries. Everything that
//! goes wrong while bringing the device up (bad configuration, missing bus,
//! runtime not available) is a setup failure and is returned to whoever called
//! the setup code.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Classification of a [`HardwareError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A register read failed during a poll cycle. Never fatal.
    TransientReadFailure,

    /// Device bring-up failed. Fatal to registration.
    SetupFailure,
}

/// Errors that can occur while talking to or setting up the touch controller.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// A register read failed.
    #[error("Register read at offset {offset:#04x} failed: {message}")]
    ReadFailed { offset: u8, message: String },

    /// The controller did not acknowledge its bus address.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// The poller could not be brought up.
    #[error("Initialization failed: {message}")]
    InitializationFailed { message: String },

    /// A configuration value is out of range.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Register layout value rejected by the decoder.
    #[error(transparent)]
    Core(#[from] touchpoll_core::Error),

    /// Configuration file could not be parsed.
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new read failure error.
    pub fn read_failed(offset: u8, message: impl Into<String>) -> Self {
        Self::ReadFailed {
            offset,
            message: message.into(),
        }
    }

    /// Controller at `device` stopped answering.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Bring-up failure with `message`.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }

    /// Rejected configuration value.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ReadFailed { .. } | Self::Disconnected { .. } | Self::Core(_) => {
                ErrorKind::TransientReadFailure
            }
            Self::InitializationFailed { .. }
            | Self::ConfigurationError { .. }
            | Self::ConfigParse(_)
            | Self::Io(_) => ErrorKind::SetupFailure,
        }
    }

    /// Whether the next poll may succeed where this one failed.
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::TransientReadFailure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_failed_error() {
        let error = HardwareError::read_failed(0x02, "NACK");
        assert!(matches!(error, HardwareError::ReadFailed { offset: 2, .. }));
        assert_eq!(
            error.to_string(),
            "Register read at offset 0x02 failed: NACK"
        );
        assert_eq!(error.kind(), ErrorKind::TransientReadFailure);
    }

    #[test]
    fn test_configuration_error() {
        let error = HardwareError::configuration("poll interval must be non-zero");
        assert_eq!(
            error.to_string(),
            "Configuration error: poll interval must be non-zero"
        );
        assert_eq!(error.kind(), ErrorKind::SetupFailure);
        assert!(!error.is_transient());
    }

    #[test]
    fn test_core_error_is_transient() {
        let error = HardwareError::from(touchpoll_core::Error::InvalidPointCount(42));
        assert!(error.is_transient());
        assert_eq!(error.to_string(), "Invalid point count: 42 (must be 0-10)");
    }

    #[test]
    fn test_parse_error_is_setup_failure() {
        let parse = serde_json::from_str::<u8>("not json").unwrap_err();
        let error = HardwareError::from(parse);
        assert_eq!(error.kind(), ErrorKind::SetupFailure);
    }

    #[test]
    fn test_error_display() {
        let disconnected = HardwareError::disconnected("touch controller at 0x38");
        assert_eq!(
            disconnected.to_string(),
            "Device disconnected: touch controller at 0x38"
        );
        assert!(disconnected.is_transient());

        let init = HardwareError::initialization_failed("no runtime");
        assert_eq!(init.to_string(), "Initialization failed: no runtime");
        assert_eq!(init.kind(), ErrorKind::SetupFailure);
    }
}
