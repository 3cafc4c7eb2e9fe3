//! Poll-and-decode routine for the touch controller.
//!
//! Each call to [`TouchDecoder::poll`] is one complete cycle:
//!
//! 1. Read the point-count register.
//! 2. Skip the cycle if the controller is not ready, or if it reports no
//!    touches and none were active before.
//! 3. Read and decode every point record. Any failed read abandons the cycle
//!    before anything reaches the sink.
//! 4. Activate every point whose event type is down or contact, in register
//!    order.
//! 5. Release every previously active id that was not seen this cycle, in
//!    ascending id order.
//! 6. Commit the batch with a single `sync_frame()`.
//!
//! Points with a lift or reserved event type produce no event but still count
//! as seen, so they are not released either.
//!
//! The set of active ids is the only state carried from one cycle to the next.
//! It changes only when a cycle completes, so a failed cycle is simply redone
//! from scratch by the next poll.

use crate::error::{HardwareError, Result};
use crate::properties::TouchscreenProperties;
use crate::ratelimit::{RateLimit, RateLimiter};
use crate::traits::{CoordinateTransform, MultiTouchSink, RegisterBus};
use touchpoll_core::constants::{POINT_READ_LEN, REG_NUM_POINTS, point_record_offset};
use touchpoll_core::{KnownIds, PointCount, PointRecord, RegisterFrame};
use tracing::{error, trace, warn};

/// What a single poll did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A register read failed or returned garbage. Nothing was emitted.
    ReadFailed,

    /// The controller was rewriting its report. Nothing was emitted.
    NotReady,

    /// No touches now and none before. Nothing was emitted.
    Idle,

    /// A frame was committed to the sink.
    Reported {
        /// Ids activated in the frame.
        active: KnownIds,

        /// Ids released in the frame.
        released: KnownIds,
    },
}

impl PollOutcome {
    /// Whether the sink received a frame.
    pub fn is_reported(&self) -> bool {
        matches!(self, Self::Reported { .. })
    }
}

enum FrameRead {
    NotReady,
    Idle,
    Ready(RegisterFrame),
}

/// Touch decoder and reporter.
///
/// Owns the set of ids reported active by the last completed poll. Polls on one
/// decoder must not overlap; taking `&mut self` makes that the caller's
/// obligation at compile time.
///
/// # Examples
///
/// ```
/// use touchpoll_core::{TouchEventType, TouchId, TouchSample};
/// use touchpoll_hardware::decoder::TouchDecoder;
/// use touchpoll_hardware::frame::{FrameRecorder, SlotEvent};
/// use touchpoll_hardware::mock::{MockRegisterBus, RegisterSnapshot};
/// use touchpoll_hardware::properties::TouchscreenProperties;
///
/// let (mut bus, handle) = MockRegisterBus::new();
/// let mut sink = FrameRecorder::new();
/// let mut decoder = TouchDecoder::new(TouchscreenProperties::default());
///
/// let slot = TouchId::new(2).unwrap();
/// handle.set_snapshot(RegisterSnapshot::from_samples(&[
///     TouchSample::new(slot, 300, 150, TouchEventType::Down),
/// ]));
///
/// assert!(decoder.poll(&mut bus, &mut sink).is_reported());
///
/// let frame = sink.take_frame().unwrap();
/// assert_eq!(frame.events, vec![SlotEvent::Activate { slot, x: 300, y: 150 }]);
/// assert!(decoder.known_ids().contains(slot));
/// ```
#[derive(Debug)]
pub struct TouchDecoder<T = TouchscreenProperties> {
    transform: T,
    known_ids: KnownIds,
    read_errors: RateLimiter,
}

impl<T: CoordinateTransform> TouchDecoder<T> {
    /// Create a decoder with no active touches.
    pub fn new(transform: T) -> Self {
        Self {
            transform,
            known_ids: KnownIds::new(),
            read_errors: RateLimiter::default(),
        }
    }

    /// Use a custom limiter for read error logging.
    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.read_errors = limiter;
        self
    }

    /// Ids reported active by the last completed poll.
    pub fn known_ids(&self) -> KnownIds {
        self.known_ids
    }

    /// Run one poll cycle.
    ///
    /// Read failures are logged, rate limited, and reported as
    /// [`PollOutcome::ReadFailed`]; they never propagate.
    pub fn poll<B, S>(&mut self, bus: &mut B, sink: &mut S) -> PollOutcome
    where
        B: RegisterBus + ?Sized,
        S: MultiTouchSink + ?Sized,
    {
        match self.read_frame(bus) {
            Ok(FrameRead::NotReady) => {
                trace!("Touch report not ready, skipping poll");
                PollOutcome::NotReady
            }
            Ok(FrameRead::Idle) => PollOutcome::Idle,
            Ok(FrameRead::Ready(frame)) => self.report(&frame, sink),
            Err(e) => {
                self.log_read_error(&e);
                PollOutcome::ReadFailed
            }
        }
    }

    fn read_frame<B: RegisterBus + ?Sized>(&self, bus: &mut B) -> Result<FrameRead> {
        let mut count = [0u8; 1];
        bus.read_block(REG_NUM_POINTS, &mut count)?;

        let num_points = match PointCount::from_register(count[0])? {
            PointCount::NotReady => return Ok(FrameRead::NotReady),
            PointCount::Points(n) => n,
        };

        if num_points == 0 && self.known_ids.is_empty() {
            return Ok(FrameRead::Idle);
        }

        let mut frame = RegisterFrame::new();
        for index in 0..num_points {
            let mut raw = [0u8; POINT_READ_LEN];
            bus.read_block(point_record_offset(index), &mut raw)?;
            frame.push(PointRecord::from_bytes(&raw)?.decode())?;
        }

        Ok(FrameRead::Ready(frame))
    }

    fn report<S: MultiTouchSink + ?Sized>(
        &mut self,
        frame: &RegisterFrame,
        sink: &mut S,
    ) -> PollOutcome {
        let observed = frame.observed_ids();
        let mut active = KnownIds::new();

        for sample in frame {
            if sample.event_type.is_reported() {
                let (x, y) = self.transform.transform(sample.x, sample.y);
                sink.activate_slot(sample.id, x, y);
                active.insert(sample.id);
            } else {
                trace!(
                    "Ignoring {} event for touch {} at ({}, {})",
                    sample.event_type, sample.id, sample.x, sample.y
                );
            }
        }

        let released = self.known_ids.difference(observed);
        for id in released {
            sink.release_slot(id);
        }

        self.known_ids = observed;
        sink.sync_frame();

        PollOutcome::Reported { active, released }
    }

    fn log_read_error(&mut self, e: &HardwareError) {
        if let RateLimit::Allowed { suppressed } = self.read_errors.check() {
            if suppressed > 0 {
                warn!("{} touch read errors suppressed", suppressed);
            }
            error!("Unable to fetch touch data: {}", e);
        }
    }
}

impl Default for TouchDecoder<TouchscreenProperties> {
    fn default() -> Self {
        Self::new(TouchscreenProperties::default())
    }
}
