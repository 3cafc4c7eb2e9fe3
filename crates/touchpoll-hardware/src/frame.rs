//! Committed batches of slot events.
//!
//! [`FrameRecorder`] is the in-process [`MultiTouchSink`]: slot updates are
//! staged until `sync_frame()` and then published together as one
//! [`TouchFrame`]. Consumers never see a partially built frame.

use crate::traits::MultiTouchSink;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use touchpoll_core::{KnownIds, TouchId};

/// One slot-state update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlotEvent {
    /// Finger contact in `slot` at `(x, y)`.
    Activate { slot: TouchId, x: u16, y: u16 },

    /// `slot` is no longer in contact.
    Release { slot: TouchId },
}

impl SlotEvent {
    pub fn slot(&self) -> TouchId {
        match self {
            Self::Activate { slot, .. } | Self::Release { slot } => *slot,
        }
    }
}

/// Slot updates published together by one `sync_frame()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchFrame {
    /// Position of this frame in the recorder's output, starting at 0.
    pub sequence: u64,

    /// When the frame was committed.
    pub timestamp: DateTime<Utc>,

    /// Updates in emission order.
    pub events: Vec<SlotEvent>,
}

impl TouchFrame {
    /// Slots activated in this frame.
    pub fn active_slots(&self) -> KnownIds {
        self.events
            .iter()
            .filter(|event| matches!(event, SlotEvent::Activate { .. }))
            .map(SlotEvent::slot)
            .collect()
    }

    /// Slots released in this frame.
    pub fn released_slots(&self) -> KnownIds {
        self.events
            .iter()
            .filter(|event| matches!(event, SlotEvent::Release { .. }))
            .map(SlotEvent::slot)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Sink that stages slot updates and commits them as [`TouchFrame`]s.
///
/// # Examples
///
/// ```
/// use touchpoll_core::TouchId;
/// use touchpoll_hardware::frame::{FrameRecorder, SlotEvent};
/// use touchpoll_hardware::traits::MultiTouchSink;
///
/// let mut recorder = FrameRecorder::new();
/// let slot = TouchId::new(2).unwrap();
///
/// recorder.activate_slot(slot, 300, 150);
/// assert!(recorder.take_frame().is_none());
///
/// recorder.sync_frame();
/// let frame = recorder.take_frame().unwrap();
/// assert_eq!(frame.events, vec![SlotEvent::Activate { slot, x: 300, y: 150 }]);
/// ```
#[derive(Debug, Default)]
pub struct FrameRecorder {
    pending: Vec<SlotEvent>,
    committed: VecDeque<TouchFrame>,
    next_sequence: u64,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates staged since the last `sync_frame()`.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Frames committed and not yet taken.
    pub fn committed_len(&self) -> usize {
        self.committed.len()
    }

    /// Take the oldest committed frame.
    pub fn take_frame(&mut self) -> Option<TouchFrame> {
        self.committed.pop_front()
    }

    /// Take every committed frame, oldest first.
    pub fn drain_frames(&mut self) -> impl Iterator<Item = TouchFrame> + '_ {
        self.committed.drain(..)
    }
}

impl MultiTouchSink for FrameRecorder {
    fn activate_slot(&mut self, id: TouchId, x: u16, y: u16) {
        self.pending.push(SlotEvent::Activate { slot: id, x, y });
    }

    fn release_slot(&mut self, id: TouchId) {
        self.pending.push(SlotEvent::Release { slot: id });
    }

    fn sync_frame(&mut self) {
        let frame = TouchFrame {
            sequence: self.next_sequence,
            timestamp: Utc::now(),
            events: std::mem::take(&mut self.pending),
        };
        self.next_sequence += 1;
        self.committed.push_back(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u8) -> TouchId {
        TouchId::new(n).unwrap()
    }

    #[test]
    fn test_events_hidden_until_sync() {
        let mut recorder = FrameRecorder::new();
        recorder.activate_slot(id(1), 10, 20);
        recorder.release_slot(id(2));

        assert_eq!(recorder.pending_len(), 2);
        assert_eq!(recorder.committed_len(), 0);

        recorder.sync_frame();
        assert_eq!(recorder.pending_len(), 0);
        assert_eq!(recorder.committed_len(), 1);

        let frame = recorder.take_frame().unwrap();
        assert_eq!(
            frame.events,
            vec![
                SlotEvent::Activate {
                    slot: id(1),
                    x: 10,
                    y: 20
                },
                SlotEvent::Release { slot: id(2) },
            ]
        );
        assert_eq!(frame.active_slots().iter().collect::<Vec<_>>(), vec![id(1)]);
        assert_eq!(
            frame.released_slots().iter().collect::<Vec<_>>(),
            vec![id(2)]
        );
    }

    #[test]
    fn test_sequence_numbers() {
        let mut recorder = FrameRecorder::new();
        recorder.sync_frame();
        recorder.sync_frame();
        recorder.sync_frame();

        let sequences: Vec<u64> = recorder.drain_frames().map(|f| f.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2]);
        assert!(recorder.take_frame().is_none());
    }

    #[test]
    fn test_empty_frame() {
        let mut recorder = FrameRecorder::new();
        recorder.sync_frame();
        assert!(recorder.take_frame().unwrap().is_empty());
    }

    #[test]
    fn test_slot_event_serialization() {
        let event = SlotEvent::Release { slot: id(4) };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"release","slot":4}"#);

        let parsed: SlotEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
