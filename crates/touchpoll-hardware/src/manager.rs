//! Periodic poller.
//!
//! This module provides the [`TouchPoller`], which validates a configuration,
//! registers the device, and drives [`TouchDecoder::poll`] on a fixed period in
//! a single tokio task. Committed frames are forwarded through a bounded
//! channel to whoever holds the [`PollerHandle`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  interval tick  ┌──────────────┐       ┌───────────────┐
//! │ RegisterBus  │◄────────────────│ Poll task    │──────►│ Frame channel │──────► Consumer
//! └──────────────┘  read_block()   │ TouchDecoder │       │ (mpsc)        │
//!                                  │ FrameRecorder│       └───────────────┘
//!                                  └──────────────┘
//! ```
//!
//! The decoder lives inside the task, so polls are serialized and never
//! overlap. Missed ticks are delayed rather than bunched up.
//!
//! # Examples
//!
//! ```no_run
//! use touchpoll_hardware::config::TouchscreenConfig;
//! use touchpoll_hardware::manager::TouchPoller;
//! use touchpoll_hardware::mock::MockRegisterBus;
//!
//! #[tokio::main]
//! async fn main() -> touchpoll_hardware::Result<()> {
//!     let (bus, _handle) = MockRegisterBus::new();
//!     let poller = TouchPoller::new(TouchscreenConfig::default(), bus)?;
//!
//!     let mut handle = poller.start()?;
//!
//!     while let Some(frame) = handle.recv().await {
//!         println!("Frame {}: {:?}", frame.sequence, frame.events);
//!     }
//!
//!     handle.shutdown().await?;
//!     Ok(())
//! }
//! ```

use crate::config::TouchscreenConfig;
use crate::decoder::{PollOutcome, TouchDecoder};
use crate::frame::{FrameRecorder, TouchFrame};
use crate::properties::TouchscreenProperties;
use crate::traits::RegisterBus;
use crate::types::{BusType, DeviceDescriptor};
use crate::{HardwareError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Poll counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollerStats {
    /// Polls started.
    pub polls: u64,

    /// Frames committed by the decoder.
    pub frames: u64,

    /// Polls abandoned because of a read failure.
    pub read_failures: u64,

    /// Polls skipped because the controller was not ready.
    pub not_ready: u64,

    /// Polls with no touches now or before.
    pub idle: u64,
}

#[derive(Debug, Default)]
struct Counters {
    polls: AtomicU64,
    frames: AtomicU64,
    read_failures: AtomicU64,
    not_ready: AtomicU64,
    idle: AtomicU64,
}

impl Counters {
    fn record(&self, outcome: PollOutcome) {
        self.polls.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            PollOutcome::ReadFailed => &self.read_failures,
            PollOutcome::NotReady => &self.not_ready,
            PollOutcome::Idle => &self.idle,
            PollOutcome::Reported { .. } => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> PollerStats {
        PollerStats {
            polls: self.polls.load(Ordering::Relaxed),
            frames: self.frames.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
            not_ready: self.not_ready.load(Ordering::Relaxed),
            idle: self.idle.load(Ordering::Relaxed),
        }
    }
}

/// Handle for receiving frames from a running poller.
///
/// The handle owns the poll task. Dropping it aborts the task at its next
/// await point without the shutdown log; call `shutdown()` for an orderly stop.
pub struct PollerHandle {
    frame_rx: mpsc::Receiver<TouchFrame>,
    tasks: JoinSet<Result<()>>,
    counters: Arc<Counters>,
    descriptor: DeviceDescriptor,
}

impl PollerHandle {
    /// Receive the next committed frame.
    ///
    /// Returns `None` once the poll task has stopped.
    pub async fn recv(&mut self) -> Option<TouchFrame> {
        self.frame_rx.recv().await
    }

    /// Current poll counters.
    pub fn stats(&self) -> PollerStats {
        self.counters.snapshot()
    }

    /// Device registered by the poller.
    pub fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    /// Stop polling and wait for the task to finish.
    ///
    /// A task that failed or panicked is logged, not returned.
    pub async fn shutdown(mut self) -> Result<()> {
        self.tasks.abort_all();

        while let Some(result) = self.tasks.join_next().await {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Poll task ended with error: {}", e),
                Err(e) if e.is_cancelled() => {}
                Err(e) => warn!("Poll task panicked: {}", e),
            }
        }

        let stats = self.counters.snapshot();
        info!(
            "Poller for {} stopped after {} polls ({} frames, {} read failures)",
            self.descriptor.name, stats.polls, stats.frames, stats.read_failures
        );
        Ok(())
    }
}

/// Registers a touch controller and polls it periodically.
///
/// # Lifecycle
///
/// 1. Create the poller from a configuration and a register bus
/// 2. Inspect the [`DeviceDescriptor`] it registers
/// 3. Call `start()` from a tokio runtime to spawn the poll task and get a handle
/// 4. Receive frames from the handle
/// 5. Call `shutdown()` on the handle, or drop it
///
/// # Blocking reads
///
/// [`RegisterBus::read_block`] is synchronous, so each poll blocks the thread
/// running the task for the length of its bus transfers. On a multi-thread
/// runtime the poll goes through [`tokio::task::block_in_place`] so other tasks
/// move off that worker. On a current-thread runtime nothing else runs until the
/// poll returns.
///
/// # Examples
///
/// ```
/// use touchpoll_hardware::config::TouchscreenConfig;
/// use touchpoll_hardware::manager::TouchPoller;
/// use touchpoll_hardware::mock::MockRegisterBus;
///
/// let (bus, _handle) = MockRegisterBus::new();
/// let poller = TouchPoller::new(TouchscreenConfig::default(), bus).unwrap();
///
/// assert_eq!(poller.descriptor().max_slots, 10);
/// assert_eq!(poller.descriptor().position_y.max, 480);
/// ```
pub struct TouchPoller<B> {
    bus: B,
    decoder: TouchDecoder,
    descriptor: DeviceDescriptor,
    poll_interval: Duration,
    channel_capacity: usize,
}

impl<B: RegisterBus + Send + 'static> TouchPoller<B> {
    /// Validate `config` and prepare a poller for the controller behind `bus`.
    ///
    /// # Errors
    ///
    /// Returns a setup failure if the configuration is invalid.
    pub fn new(config: TouchscreenConfig, bus: B) -> Result<Self> {
        config.validate()?;

        let properties = TouchscreenProperties::from_config(&config);
        let descriptor = DeviceDescriptor::from_config(&config);
        debug!(
            "Registering {}: {}x{} axes, inverted_x={} inverted_y={} swapped={}",
            descriptor.name,
            descriptor.position_x.max,
            descriptor.position_y.max,
            properties.invert_x,
            properties.invert_y,
            properties.swap_x_y
        );

        Ok(Self {
            bus,
            decoder: TouchDecoder::new(properties),
            descriptor,
            poll_interval: config.poll_interval(),
            channel_capacity: config.channel_capacity,
        })
    }

    /// Override the bus type reported in the descriptor.
    pub fn with_bus_type(mut self, bus_type: BusType) -> Self {
        self.descriptor = self.descriptor.with_bus_type(bus_type);
        self
    }

    pub fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Spawn the poll task and return a handle to its frames.
    ///
    /// # Errors
    ///
    /// Returns a setup failure if called outside a tokio runtime.
    pub fn start(self) -> Result<PollerHandle> {
        if Handle::try_current().is_err() {
            return Err(HardwareError::initialization_failed(
                "poller must be started from within a tokio runtime",
            ));
        }

        let (frame_tx, frame_rx) = mpsc::channel(self.channel_capacity);
        let counters = Arc::new(Counters::default());

        info!(
            "Polling {} every {:?}",
            self.descriptor.name, self.poll_interval
        );

        let mut tasks = JoinSet::new();
        tasks.spawn(Self::poll_task(
            self.bus,
            self.decoder,
            self.poll_interval,
            frame_tx,
            Arc::clone(&counters),
        ));

        Ok(PollerHandle {
            frame_rx,
            tasks,
            counters,
            descriptor: self.descriptor,
        })
    }

    async fn poll_task(
        mut bus: B,
        mut decoder: TouchDecoder,
        period: Duration,
        tx: mpsc::Sender<TouchFrame>,
        counters: Arc<Counters>,
    ) -> Result<()> {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut recorder = FrameRecorder::new();
        let multi_thread = Handle::current().runtime_flavor() == RuntimeFlavor::MultiThread;

        loop {
            ticker.tick().await;

            let outcome = if multi_thread {
                tokio::task::block_in_place(|| decoder.poll(&mut bus, &mut recorder))
            } else {
                decoder.poll(&mut bus, &mut recorder)
            };
            counters.record(outcome);

            while let Some(frame) = recorder.take_frame() {
                counters.frames.fetch_add(1, Ordering::Relaxed);
                if tx.send(frame).await.is_err() {
                    debug!("Frame receiver closed, stopping poller");
                    return Ok(());
                }
            }
        }
    }
}
