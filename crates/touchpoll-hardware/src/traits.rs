//! Collaborator interfaces around the touch decoder.
//!
//! The decoder sits between three seams:
//!
//! ```text
//! RegisterBus ──► TouchDecoder::poll() ──► MultiTouchSink
//!                        │
//!                        └──► CoordinateTransform
//! ```
//!
//! All three are synchronous. A poll runs to completion on whatever thread the
//! scheduler uses, so there is nothing to await inside a cycle.

use crate::error::Result;
use touchpoll_core::TouchId;

/// Byte-addressed register access to the touch controller.
///
/// Implementations own any bus-level timeout or retry policy. A failed read
/// must be reported as an error, never as partially filled data.
///
/// # Examples
///
/// ```
/// use touchpoll_hardware::traits::RegisterBus;
/// use touchpoll_hardware::Result;
///
/// fn read_count<B: RegisterBus>(bus: &mut B) -> Result<u8> {
///     let mut count = [0u8; 1];
///     bus.read_block(2, &mut count)?;
///     Ok(count[0])
/// }
/// ```
pub trait RegisterBus {
    /// Read `buf.len()` consecutive registers starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus transaction fails for any reason.
    fn read_block(&mut self, offset: u8, buf: &mut [u8]) -> Result<()>;
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    fn read_block(&mut self, offset: u8, buf: &mut [u8]) -> Result<()> {
        (**self).read_block(offset, buf)
    }
}

impl<B: RegisterBus + ?Sized> RegisterBus for Box<B> {
    fn read_block(&mut self, offset: u8, buf: &mut [u8]) -> Result<()> {
        (**self).read_block(offset, buf)
    }
}

/// Orientation policy applied to every decoded coordinate before reporting.
pub trait CoordinateTransform {
    /// Map raw controller coordinates to reported coordinates.
    fn transform(&self, x: u16, y: u16) -> (u16, u16);
}

/// Reports coordinates unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

impl CoordinateTransform for Identity {
    fn transform(&self, x: u16, y: u16) -> (u16, u16) {
        (x, y)
    }
}

/// Multi-touch event consumer.
///
/// Calls arrive in the order the decoder guarantees: activations, then
/// releases, then exactly one [`sync_frame`](MultiTouchSink::sync_frame). A
/// sink must not expose any event of a batch before `sync_frame` commits it.
pub trait MultiTouchSink {
    /// Report a finger contact in slot `id` at `(x, y)`.
    fn activate_slot(&mut self, id: TouchId, x: u16, y: u16);

    /// Report slot `id` as no longer in contact.
    fn release_slot(&mut self, id: TouchId);

    /// Close the current batch and publish it.
    fn sync_frame(&mut self);
}

impl<S: MultiTouchSink + ?Sized> MultiTouchSink for &mut S {
    fn activate_slot(&mut self, id: TouchId, x: u16, y: u16) {
        (**self).activate_slot(id, x, y);
    }

    fn release_slot(&mut self, id: TouchId) {
        (**self).release_slot(id);
    }

    fn sync_frame(&mut self) {
        (**self).sync_frame();
    }
}
