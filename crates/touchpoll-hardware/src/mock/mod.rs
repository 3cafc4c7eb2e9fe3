//! Scriptable stand-ins for the touch controller.
//!
//! [`MockRegisterBus`] serves reads from an in-memory register file, so the
//! decoder and poller can be exercised without a panel attached.

pub mod register_bus;

pub use register_bus::{MockRegisterBus, MockRegisterBusHandle, RegisterSnapshot};
