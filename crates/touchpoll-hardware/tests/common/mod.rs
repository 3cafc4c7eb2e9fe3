//! Common test utilities for integration tests.
//!
//! Builders for touch samples and register snapshots, plus a [`Rig`] that
//! wires a decoder to a scripted mock bus and a frame recorder so a test can
//! express one poll as "these registers in, this frame out".
//!
//! # Usage Examples
//!
//! ```ignore
//! use crate::common::{self, Rig};
//!
//! let mut rig = Rig::new();
//! let frame = rig.poll(&[common::down(2, 300, 150)]).unwrap();
//! common::assert_activations(&frame, &[(2, 300, 150)]);
//! ```

#![allow(dead_code)]

use touchpoll_core::{KnownIds, TouchEventType, TouchId, TouchSample};
use touchpoll_hardware::decoder::{PollOutcome, TouchDecoder};
use touchpoll_hardware::frame::{FrameRecorder, SlotEvent, TouchFrame};
use touchpoll_hardware::mock::{MockRegisterBus, MockRegisterBusHandle, RegisterSnapshot};
use touchpoll_hardware::traits::{CoordinateTransform, Identity};

/// Build a touch id.
///
/// # Panics
///
/// Panics if `n` does not fit the 4-bit id field.
pub fn id(n: u8) -> TouchId {
    TouchId::new(n).expect("Test helper: touch id must be 0-15")
}

/// Build a set of touch ids.
pub fn ids(list: &[u8]) -> KnownIds {
    list.iter().map(|&n| id(n)).collect()
}

pub fn touch(n: u8, x: u16, y: u16, event_type: TouchEventType) -> TouchSample {
    TouchSample::new(id(n), x, y, event_type)
}

pub fn down(n: u8, x: u16, y: u16) -> TouchSample {
    touch(n, x, y, TouchEventType::Down)
}

pub fn contact(n: u8, x: u16, y: u16) -> TouchSample {
    touch(n, x, y, TouchEventType::Contact)
}

pub fn lift(n: u8, x: u16, y: u16) -> TouchSample {
    touch(n, x, y, TouchEventType::Lift)
}

/// Decoder, mock bus and recorder wired together.
pub struct Rig<T = Identity> {
    pub decoder: TouchDecoder<T>,
    pub bus: MockRegisterBus,
    pub handle: MockRegisterBusHandle,
    pub sink: FrameRecorder,
}

impl Rig<Identity> {
    /// Rig that reports raw controller coordinates.
    pub fn new() -> Self {
        Self::with_transform(Identity)
    }
}

impl<T: CoordinateTransform> Rig<T> {
    pub fn with_transform(transform: T) -> Self {
        let (bus, handle) = MockRegisterBus::new();
        Self {
            decoder: TouchDecoder::new(transform),
            bus,
            handle,
            sink: FrameRecorder::new(),
        }
    }

    /// Poll once against whatever the bus currently holds.
    pub fn poll_current(&mut self) -> PollOutcome {
        self.decoder.poll(&mut self.bus, &mut self.sink)
    }

    /// Poll once against `snapshot`.
    pub fn poll_snapshot(&mut self, snapshot: RegisterSnapshot) -> (PollOutcome, Option<TouchFrame>) {
        self.handle.set_snapshot(snapshot);
        let outcome = self.poll_current();
        (outcome, self.sink.take_frame())
    }

    /// Poll once against a report of `samples` and return the committed frame.
    pub fn poll(&mut self, samples: &[TouchSample]) -> Option<TouchFrame> {
        self.poll_snapshot(RegisterSnapshot::from_samples(samples)).1
    }

    pub fn known(&self) -> KnownIds {
        self.decoder.known_ids()
    }
}

/// Assert the frame's activations, in order, as `(id, x, y)`.
pub fn assert_activations(frame: &TouchFrame, expected: &[(u8, u16, u16)]) {
    let actual: Vec<(u8, u16, u16)> = frame
        .events
        .iter()
        .filter_map(|event| match *event {
            SlotEvent::Activate { slot, x, y } => Some((slot.as_u8(), x, y)),
            SlotEvent::Release { .. } => None,
        })
        .collect();
    assert_eq!(actual, expected, "activations of frame {}", frame.sequence);
}

/// Assert the frame's releases, in order.
pub fn assert_releases(frame: &TouchFrame, expected: &[u8]) {
    let actual: Vec<u8> = frame
        .events
        .iter()
        .filter_map(|event| match event {
            SlotEvent::Release { slot } => Some(slot.as_u8()),
            SlotEvent::Activate { .. } => None,
        })
        .collect();
    assert_eq!(actual, expected, "releases of frame {}", frame.sequence);
}

/// Assert that every activation comes before the first release.
pub fn assert_activations_first(frame: &TouchFrame) {
    let first_release = frame
        .events
        .iter()
        .position(|event| matches!(event, SlotEvent::Release { .. }))
        .unwrap_or(frame.events.len());
    assert!(
        frame.events[first_release..]
            .iter()
            .all(|event| matches!(event, SlotEvent::Release { .. })),
        "activation after release in frame {}: {:?}",
        frame.sequence,
        frame.events
    );
}
