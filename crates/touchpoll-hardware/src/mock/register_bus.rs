//! Mock register bus for testing and development.
//!
//! The bus serves reads from an in-memory copy of the controller's register
//! file. Snapshots queued through the handle are latched one at a time, each
//! time the point-count register is read, which is the first read of every
//! poll. Failures can be injected per register offset.

use crate::{HardwareError, Result, traits::RegisterBus};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use touchpoll_core::constants::{
    MAX_SUPPORTED_POINTS, NUM_POINTS_INVALIDATE, POINT_READ_LEN, REG_NUM_POINTS, REGISTER_FILE_LEN,
    point_record_offset,
};
use touchpoll_core::{PointRecord, TouchSample};

/// Contents of the controller's register file at one instant.
///
/// # Examples
///
/// ```
/// use touchpoll_core::{TouchEventType, TouchId, TouchSample};
/// use touchpoll_hardware::mock::RegisterSnapshot;
///
/// let sample = TouchSample::new(TouchId::new(2).unwrap(), 300, 150, TouchEventType::Down);
/// let snapshot = RegisterSnapshot::from_samples(&[sample]);
///
/// assert_eq!(snapshot.num_points(), 1);
/// assert_eq!(&snapshot.as_bytes()[3..7], &[0x01, 0x2C, 0x20, 0x96]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterSnapshot {
    registers: [u8; REGISTER_FILE_LEN],
}

impl RegisterSnapshot {
    /// A register file reporting no touches.
    pub fn empty() -> Self {
        Self {
            registers: [0; REGISTER_FILE_LEN],
        }
    }

    /// A register file whose point count holds the not-ready sentinel.
    pub fn not_ready() -> Self {
        Self::empty().with_num_points(NUM_POINTS_INVALIDATE)
    }

    /// A register file reporting `samples` in order. At most ten are kept.
    pub fn from_samples(samples: &[TouchSample]) -> Self {
        let samples = &samples[..samples.len().min(MAX_SUPPORTED_POINTS)];
        let mut snapshot = Self::empty().with_num_points(samples.len() as u8);
        for (index, sample) in samples.iter().enumerate() {
            snapshot = snapshot.with_record(index, PointRecord::encode(sample));
        }
        snapshot
    }

    /// Overwrite the point-count register.
    pub fn with_num_points(mut self, num_points: u8) -> Self {
        self.registers[REG_NUM_POINTS as usize] = num_points;
        self
    }

    /// Overwrite the first four bytes of point record `index`.
    ///
    /// Indexes past the last record are ignored.
    pub fn with_record(mut self, index: usize, record: PointRecord) -> Self {
        if index < MAX_SUPPORTED_POINTS {
            let start = point_record_offset(index) as usize;
            self.registers[start..start + POINT_READ_LEN].copy_from_slice(&record.to_bytes());
        }
        self
    }

    pub fn num_points(&self) -> u8 {
        self.registers[REG_NUM_POINTS as usize]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.registers
    }
}

impl Default for RegisterSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Default)]
struct BusState {
    current: RegisterSnapshot,
    queued: VecDeque<RegisterSnapshot>,
    failures: HashMap<u8, u32>,
    reads: u64,
    failed_reads: u64,
}

fn lock(state: &Mutex<BusState>) -> MutexGuard<'_, BusState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock register bus for testing and development.
///
/// # Examples
///
/// ```
/// use touchpoll_hardware::mock::{MockRegisterBus, RegisterSnapshot};
/// use touchpoll_hardware::traits::RegisterBus;
///
/// let (mut bus, handle) = MockRegisterBus::new();
/// handle.push_snapshot(RegisterSnapshot::not_ready());
///
/// let mut count = [0u8; 1];
/// bus.read_block(2, &mut count).unwrap();
/// assert_eq!(count, [99]);
///
/// handle.fail_reads(2, 1);
/// assert!(bus.read_block(2, &mut count).is_err());
/// ```
#[derive(Debug)]
pub struct MockRegisterBus {
    state: Arc<Mutex<BusState>>,
    name: String,
}

impl MockRegisterBus {
    /// Create a new mock bus with the default name.
    ///
    /// Returns the bus together with a handle that scripts its contents.
    pub fn new() -> (Self, MockRegisterBusHandle) {
        Self::with_name("Mock Register Bus".to_string())
    }

    /// Create a new mock bus with a custom name.
    pub fn with_name(name: String) -> (Self, MockRegisterBusHandle) {
        let state = Arc::new(Mutex::new(BusState::default()));

        let bus = Self {
            state: Arc::clone(&state),
            name: name.clone(),
        };
        let handle = MockRegisterBusHandle { state, name };

        (bus, handle)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl RegisterBus for MockRegisterBus {
    fn read_block(&mut self, offset: u8, buf: &mut [u8]) -> Result<()> {
        let mut state = lock(&self.state);
        state.reads += 1;

        if offset == REG_NUM_POINTS
            && let Some(next) = state.queued.pop_front()
        {
            state.current = next;
        }

        if let Some(remaining) = state.failures.get_mut(&offset)
            && *remaining > 0
        {
            *remaining -= 1;
            state.failed_reads += 1;
            return Err(HardwareError::read_failed(offset, "injected failure"));
        }

        let start = offset as usize;
        let source = state
            .current
            .as_bytes()
            .get(start..start + buf.len())
            .ok_or_else(|| HardwareError::read_failed(offset, "read past end of register file"))?;
        buf.copy_from_slice(source);
        Ok(())
    }
}

/// Handle for scripting a mock register bus.
///
/// Clones share the same bus.
#[derive(Debug, Clone)]
pub struct MockRegisterBusHandle {
    state: Arc<Mutex<BusState>>,
    name: String,
}

impl MockRegisterBusHandle {
    /// Queue a snapshot to be latched by a later point-count read.
    pub fn push_snapshot(&self, snapshot: RegisterSnapshot) {
        lock(&self.state).queued.push_back(snapshot);
    }

    /// Replace the register file now and drop any queued snapshots.
    pub fn set_snapshot(&self, snapshot: RegisterSnapshot) {
        let mut state = lock(&self.state);
        state.queued.clear();
        state.current = snapshot;
    }

    /// Make the next `times` reads at `offset` fail.
    pub fn fail_reads(&self, offset: u8, times: u32) {
        *lock(&self.state).failures.entry(offset).or_insert(0) += times;
    }

    /// Make the next `times` reads of point record `index` fail.
    pub fn fail_point_reads(&self, index: usize, times: u32) {
        self.fail_reads(point_record_offset(index), times);
    }

    /// Snapshots waiting to be latched.
    pub fn queued_len(&self) -> usize {
        lock(&self.state).queued.len()
    }

    /// Reads attempted so far, including failed ones.
    pub fn read_count(&self) -> u64 {
        lock(&self.state).reads
    }

    /// Reads that failed because of an injected failure.
    pub fn failed_read_count(&self) -> u64 {
        lock(&self.state).failed_reads
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
