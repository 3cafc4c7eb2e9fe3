//! Register layout and driver constants for the polled touch controller.
//!
//! The controller exposes a flat, byte-addressed register file. Everything the
//! decoder needs lives in the first 63 bytes:
//!
//! ```text
//! offset  0      1           2            3 .. 8        9 .. 14      ...
//!       ┌──────┬───────────┬────────────┬─────────────┬─────────────┬─────
//!       │ mode │ gesture   │ num_points │ point[0]    │ point[1]    │ ...
//!       └──────┴───────────┴────────────┴─────────────┴─────────────┴─────
//!
//! point[i] = xh  xl  yh  yl  pressure  area
//!            ───────────────  ──────────────
//!            read (4 bytes)   never read
//! ```
//!
//! Bit layout inside a point record:
//!
//! | Byte | Bits 7-6   | Bits 5-4 | Bits 3-0    |
//! |------|------------|----------|-------------|
//! | `xh` | event type | unused   | x[11:8]     |
//! | `yh` | touch id (bits 7-4)   || y[11:8]     |
//!
//! # Usage
//!
//! ```
//! use touchpoll_core::constants::*;
//!
//! assert_eq!(REG_NUM_POINTS, 2);
//! assert_eq!(point_record_offset(0), 3);
//! assert_eq!(point_record_offset(9), 57);
//! ```

use std::time::Duration;

// ============================================================================
// Register Layout
// ============================================================================

/// Device mode register. Not used by the decoder.
pub const REG_DEVICE_MODE: u8 = 0;

/// Gesture id register. Not used by the decoder.
pub const REG_GESTURE_ID: u8 = 1;

/// Number of valid point records in the current report.
pub const REG_NUM_POINTS: u8 = 2;

/// Offset of the first point record.
pub const REG_POINTS_BASE: u8 = 3;

/// Stride between consecutive point records.
pub const POINT_RECORD_SIZE: u8 = 6;

/// Number of bytes of each point record consumed by the decoder (`xh, xl, yh, yl`).
///
/// The trailing pressure and area bytes are not supported by the controller
/// firmware and are never read.
pub const POINT_READ_LEN: usize = 4;

/// Total size of the register file covered by the layout.
pub const REGISTER_FILE_LEN: usize =
    REG_POINTS_BASE as usize + POINT_RECORD_SIZE as usize * MAX_SUPPORTED_POINTS;

/// Register offset of point record `index`.
///
/// # Examples
///
/// ```
/// use touchpoll_core::constants::point_record_offset;
///
/// assert_eq!(point_record_offset(1), 9);
/// ```
pub const fn point_record_offset(index: usize) -> u8 {
    REG_POINTS_BASE + (index as u8) * POINT_RECORD_SIZE
}

// ============================================================================
// Report Semantics
// ============================================================================

/// Maximum number of simultaneous contacts reported by the controller.
pub const MAX_SUPPORTED_POINTS: usize = 10;

/// `num_points` value the firmware writes while a report is being assembled.
///
/// A poll that reads this value must be skipped entirely.
pub const NUM_POINTS_INVALIDATE: u8 = 99;

/// Event type code for a new contact.
pub const EVENT_TYPE_DOWN: u8 = 0;

/// Event type code for a lifted contact. Decoded but never acted upon.
pub const EVENT_TYPE_LIFT: u8 = 1;

/// Event type code for a contact that is still touching.
pub const EVENT_TYPE_CONTACT: u8 = 2;

/// Reserved event type code. Decoded but never acted upon.
pub const EVENT_TYPE_RESERVED: u8 = 3;

/// Number of distinct touch ids representable by the 4-bit id field.
pub const TOUCH_ID_SPACE: usize = 16;

/// Largest value a 12-bit coordinate can take.
pub const MAX_COORDINATE: u16 = 0x0FFF;

// ============================================================================
// Registration Defaults
// ============================================================================

/// Input device name published at registration.
pub const DEVICE_NAME: &str = "raspberrypi-i2c-ts";

/// Default 7-bit I2C address of the touch controller.
pub const DEFAULT_I2C_ADDRESS: u8 = 0x38;

/// Default reporting width when no touchscreen size is configured.
pub const DEFAULT_WIDTH: u16 = 800;

/// Default reporting height when no touchscreen size is configured.
pub const DEFAULT_HEIGHT: u16 = 480;

/// Number of multi-touch slots exposed to the input subsystem. Not configurable.
pub const MAX_SLOTS: usize = MAX_SUPPORTED_POINTS;

/// Poll period in milliseconds (about 60 polls per second).
pub const POLL_INTERVAL_MS: u64 = 17;

/// Poll period as a [`Duration`].
pub const POLL_INTERVAL: Duration = Duration::from_millis(POLL_INTERVAL_MS);
