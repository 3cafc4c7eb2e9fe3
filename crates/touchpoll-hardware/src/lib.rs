//! Polled multi-touch controller driver.
//!
//! This crate reads an FT5406-style touch controller through a byte-addressed
//! register bus, decodes its point records, and reports contacts as
//! multi-touch slot updates. It contains the pieces a host integration needs
//! around that decoder: configuration, orientation handling, a periodic poller,
//! and an evdev-style encoder for committed frames.
//!
//! # Design Philosophy
//!
//! - **Synchronous decode**: a poll cycle is a handful of short register reads
//!   and never awaits. The async part is limited to the [`manager`] task that
//!   schedules polls.
//! - **All or nothing**: every point record is read and decoded before the first
//!   event reaches the sink, so a failed read leaves no partial frame behind.
//! - **Trait seams**: the bus ([`RegisterBus`]), the orientation policy
//!   ([`CoordinateTransform`]) and the event consumer ([`MultiTouchSink`]) are
//!   traits, and the [`mock`] module provides a scriptable bus for tests.
//!
//! # Decoding a poll
//!
//! ```
//! use touchpoll_core::{TouchEventType, TouchId, TouchSample};
//! use touchpoll_hardware::decoder::{PollOutcome, TouchDecoder};
//! use touchpoll_hardware::frame::FrameRecorder;
//! use touchpoll_hardware::mock::{MockRegisterBus, RegisterSnapshot};
//!
//! let (mut bus, handle) = MockRegisterBus::new();
//! let mut sink = FrameRecorder::new();
//! let mut decoder = TouchDecoder::default();
//!
//! handle.set_snapshot(RegisterSnapshot::from_samples(&[TouchSample::new(
//!     TouchId::new(0).unwrap(),
//!     120,
//!     80,
//!     TouchEventType::Contact,
//! )]));
//! assert!(decoder.poll(&mut bus, &mut sink).is_reported());
//!
//! handle.set_snapshot(RegisterSnapshot::empty());
//! let outcome = decoder.poll(&mut bus, &mut sink);
//! assert!(matches!(outcome, PollOutcome::Reported { .. }));
//! assert!(decoder.known_ids().is_empty());
//! assert_eq!(sink.committed_len(), 2);
//! ```
//!
//! # Error Handling
//!
//! Setup operations return [`Result<T>`][error::Result] with a
//! [`HardwareError`]. Read failures during a poll are never returned: the
//! decoder logs them through a rate limiter and the next poll retries.
//!
//! # Features
//!
//! - `hardware-i2c` (default): [`i2c::I2cRegisterBus`] over any blocking
//!   `embedded-hal` I2C bus.
//!
//! [`RegisterBus`]: traits::RegisterBus
//! [`CoordinateTransform`]: traits::CoordinateTransform
//! [`MultiTouchSink`]: traits::MultiTouchSink

pub mod config;
pub mod decoder;
pub mod error;
pub mod evdev;
pub mod frame;
#[cfg(feature = "hardware-i2c")]
pub mod i2c;
pub mod manager;
pub mod mock;
pub mod properties;
pub mod ratelimit;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use config::{PropertyOverrides, TouchscreenConfig};
pub use decoder::{PollOutcome, TouchDecoder};
pub use error::{ErrorKind, HardwareError, Result};
pub use frame::{FrameRecorder, SlotEvent, TouchFrame};
pub use properties::TouchscreenProperties;
pub use traits::{CoordinateTransform, Identity, MultiTouchSink, RegisterBus};
pub use types::{AbsAxis, BusType, DeviceDescriptor};

// Re-export poller types
pub use manager::{PollerHandle, PollerStats, TouchPoller};

#[cfg(feature = "hardware-i2c")]
pub use i2c::I2cRegisterBus;
