use crate::{
    Result,
    constants::{
        EVENT_TYPE_CONTACT, EVENT_TYPE_DOWN, EVENT_TYPE_LIFT, EVENT_TYPE_RESERVED,
        MAX_SUPPORTED_POINTS, NUM_POINTS_INVALIDATE, POINT_READ_LEN, TOUCH_ID_SPACE,
    },
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Extract a 12-bit coordinate from its high and low registers.
///
/// Only the low nibble of the high register carries coordinate bits.
///
/// # Examples
///
/// ```
/// use touchpoll_core::coordinate_from_registers;
///
/// assert_eq!(coordinate_from_registers(0x42, 0x10), 528);
/// ```
#[must_use]
pub const fn coordinate_from_registers(high: u8, low: u8) -> u16 {
    (((high & 0x0F) as u16) << 8) | low as u16
}

/// Extract the 2-bit event type code from the x-high register (bits 6-7).
#[must_use]
pub const fn event_code_from_register(xh: u8) -> u8 {
    (xh >> 6) & 0x03
}

/// Extract the 4-bit touch id from the y-high register (bits 4-7).
#[must_use]
pub const fn touch_id_from_register(yh: u8) -> u8 {
    (yh >> 4) & 0x0F
}

/// Controller-assigned contact identifier.
///
/// The id field is 4 bits wide. Normal firmware only hands out 0-9, but every
/// representable value is accepted and tracked as its own slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TouchId(u8);

impl TouchId {
    /// Create a new touch id with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidTouchId` if the id does not fit the 4-bit field.
    pub fn new(id: u8) -> Result<Self> {
        if id as usize >= TOUCH_ID_SPACE {
            return Err(Error::InvalidTouchId(id));
        }
        Ok(TouchId(id))
    }

    /// Decode the touch id carried by a y-high register.
    #[must_use]
    pub const fn from_register(yh: u8) -> Self {
        TouchId(touch_id_from_register(yh))
    }

    /// Get the raw id as u8.
    #[must_use]
    pub const fn as_u8(&self) -> u8 {
        self.0
    }

    /// Get the id as a slot index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    const fn bit(&self) -> u16 {
        1 << self.0
    }
}

impl fmt::Display for TouchId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for TouchId {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self> {
        TouchId::new(id)
    }
}

impl From<TouchId> for u8 {
    fn from(id: TouchId) -> Self {
        id.0
    }
}

/// Event type reported for a point record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchEventType {
    /// Contact just went down.
    Down,

    /// Contact lifted. The controller reports it but the decoder ignores it.
    Lift,

    /// Contact is still touching.
    Contact,

    /// Reserved code.
    Reserved,
}

impl TouchEventType {
    /// Decode the event type carried by an x-high register.
    #[must_use]
    pub const fn from_register(xh: u8) -> Self {
        match event_code_from_register(xh) {
            EVENT_TYPE_DOWN => Self::Down,
            EVENT_TYPE_LIFT => Self::Lift,
            EVENT_TYPE_CONTACT => Self::Contact,
            _ => Self::Reserved,
        }
    }

    /// Get the 2-bit code.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::Down => EVENT_TYPE_DOWN,
            Self::Lift => EVENT_TYPE_LIFT,
            Self::Contact => EVENT_TYPE_CONTACT,
            Self::Reserved => EVENT_TYPE_RESERVED,
        }
    }

    /// Whether a point with this event type is reported as an active contact.
    #[must_use]
    pub const fn is_reported(&self) -> bool {
        matches!(self, Self::Down | Self::Contact)
    }
}

impl fmt::Display for TouchEventType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Down => "down",
            Self::Lift => "lift",
            Self::Contact => "contact",
            Self::Reserved => "reserved",
        };
        write!(f, "{name}")
    }
}

/// Raw 4-byte prefix of a point record: `xh, xl, yh, yl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PointRecord {
    pub xh: u8,
    pub xl: u8,
    pub yh: u8,
    pub yl: u8,
}

impl PointRecord {
    /// Build a record from the bytes read at a point offset.
    ///
    /// Bytes beyond the first four are ignored.
    ///
    /// # Errors
    /// Returns `Error::ShortPointRecord` if fewer than four bytes are given.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match bytes {
            [xh, xl, yh, yl, ..] => Ok(Self {
                xh: *xh,
                xl: *xl,
                yh: *yh,
                yl: *yl,
            }),
            _ => Err(Error::ShortPointRecord {
                expected: POINT_READ_LEN,
                actual: bytes.len(),
            }),
        }
    }

    /// Encode a sample back into register bytes.
    ///
    /// Coordinates are truncated to 12 bits.
    #[must_use]
    pub fn encode(sample: &TouchSample) -> Self {
        Self {
            xh: (sample.event_type.code() << 6) | ((sample.x >> 8) as u8 & 0x0F),
            xl: sample.x as u8,
            yh: (sample.id.as_u8() << 4) | ((sample.y >> 8) as u8 & 0x0F),
            yl: sample.y as u8,
        }
    }

    /// Get the record as register bytes.
    #[must_use]
    pub const fn to_bytes(&self) -> [u8; POINT_READ_LEN] {
        [self.xh, self.xl, self.yh, self.yl]
    }

    /// Decode the packed bit fields into a sample.
    #[must_use]
    pub const fn decode(&self) -> TouchSample {
        TouchSample {
            id: TouchId::from_register(self.yh),
            x: coordinate_from_registers(self.xh, self.xl),
            y: coordinate_from_registers(self.yh, self.yl),
            event_type: TouchEventType::from_register(self.xh),
        }
    }
}

/// One decoded touch point. Rebuilt on every poll, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TouchSample {
    pub id: TouchId,
    pub x: u16,
    pub y: u16,
    pub event_type: TouchEventType,
}

impl TouchSample {
    const UNSET: TouchSample = TouchSample {
        id: TouchId(0),
        x: 0,
        y: 0,
        event_type: TouchEventType::Reserved,
    };

    /// Create a new sample.
    #[must_use]
    pub const fn new(id: TouchId, x: u16, y: u16, event_type: TouchEventType) -> Self {
        Self {
            id,
            x,
            y,
            event_type,
        }
    }
}

/// Interpretation of the `num_points` register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointCount {
    /// The firmware is rewriting the report; skip this poll.
    NotReady,

    /// Number of valid point records, 0 through 10.
    Points(usize),
}

impl PointCount {
    /// Classify a raw `num_points` value.
    ///
    /// # Errors
    /// Returns `Error::InvalidPointCount` for values above 10 other than the
    /// not-ready sentinel.
    pub fn from_register(raw: u8) -> Result<Self> {
        if raw == NUM_POINTS_INVALIDATE {
            return Ok(Self::NotReady);
        }
        if raw as usize > MAX_SUPPORTED_POINTS {
            return Err(Error::InvalidPointCount(raw));
        }
        Ok(Self::Points(raw as usize))
    }
}

/// Samples decoded from one poll, in register index order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFrame {
    points: [TouchSample; MAX_SUPPORTED_POINTS],
    len: usize,
}

impl RegisterFrame {
    /// Create an empty frame.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            points: [TouchSample::UNSET; MAX_SUPPORTED_POINTS],
            len: 0,
        }
    }

    /// Append a decoded sample.
    ///
    /// # Errors
    /// Returns `Error::FrameFull` once ten samples are held.
    pub fn push(&mut self, sample: TouchSample) -> Result<()> {
        let slot = self
            .points
            .get_mut(self.len)
            .ok_or(Error::FrameFull(MAX_SUPPORTED_POINTS))?;
        *slot = sample;
        self.len += 1;
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn as_slice(&self) -> &[TouchSample] {
        &self.points[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TouchSample> {
        self.as_slice().iter()
    }

    /// Ids present in the frame, whatever their event type.
    #[must_use]
    pub fn observed_ids(&self) -> KnownIds {
        self.iter().map(|sample| sample.id).collect()
    }
}

impl Default for RegisterFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a RegisterFrame {
    type Item = &'a TouchSample;
    type IntoIter = std::slice::Iter<'a, TouchSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Set of touch ids, one bit per id.
///
/// Wide enough for the whole 4-bit id space. Iteration is in ascending id order.
///
/// # Examples
///
/// ```
/// use touchpoll_core::{KnownIds, TouchId};
///
/// let mut ids = KnownIds::new();
/// ids.insert(TouchId::new(5).unwrap());
/// ids.insert(TouchId::new(3).unwrap());
///
/// let order: Vec<u8> = ids.iter().map(|id| id.as_u8()).collect();
/// assert_eq!(order, vec![3, 5]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct KnownIds(u16);

impl KnownIds {
    /// The empty set.
    pub const EMPTY: KnownIds = KnownIds(0);

    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Build a set from its raw bitmask.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Get the raw bitmask.
    #[must_use]
    pub const fn bits(&self) -> u16 {
        self.0
    }

    pub fn insert(&mut self, id: TouchId) {
        self.0 |= id.bit();
    }

    pub fn remove(&mut self, id: TouchId) {
        self.0 &= !id.bit();
    }

    #[must_use]
    pub const fn contains(&self, id: TouchId) -> bool {
        self.0 & id.bit() != 0
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Ids in `self` that are not in `other`.
    #[must_use]
    pub const fn difference(&self, other: KnownIds) -> KnownIds {
        KnownIds(self.0 & !other.0)
    }

    pub fn iter(&self) -> KnownIdsIter {
        KnownIdsIter { remaining: self.0 }
    }
}

impl FromIterator<TouchId> for KnownIds {
    fn from_iter<T: IntoIterator<Item = TouchId>>(iter: T) -> Self {
        let mut ids = KnownIds::new();
        for id in iter {
            ids.insert(id);
        }
        ids
    }
}

impl IntoIterator for KnownIds {
    type Item = TouchId;
    type IntoIter = KnownIdsIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for KnownIds {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, id) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{id}")?;
        }
        write!(f, "}}")
    }
}

/// Ascending iterator over the ids in a [`KnownIds`].
#[derive(Debug, Clone)]
pub struct KnownIdsIter {
    remaining: u16,
}

impl Iterator for KnownIdsIter {
    type Item = TouchId;

    fn next(&mut self) -> Option<TouchId> {
        if self.remaining == 0 {
            return None;
        }
        let lowest = self.remaining.trailing_zeros() as u8;
        self.remaining &= self.remaining - 1;
        Some(TouchId(lowest))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for KnownIdsIter {}
