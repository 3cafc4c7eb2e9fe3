//! Linux input event encoding.
//!
//! [`EvdevEncoder`] converts committed [`TouchFrame`]s into the event stream a
//! multi-touch protocol B device produces: slot selection, tracking ids,
//! positions, then single-touch pointer emulation and `SYN_REPORT`. Events are
//! built with the `evdev` crate's typed codes.
//!
//! Like the input core, the encoder drops events that would not change the
//! device state, so a frame that changes nothing encodes to no events at all.

use crate::frame::{SlotEvent, TouchFrame};
use crate::types::DeviceDescriptor;
use ::evdev::{
    AbsoluteAxisCode, AbsoluteAxisEvent, EventType, InputEvent, KeyCode, KeyEvent,
    SynchronizationCode, SynchronizationEvent,
};

/// `ABS_MT_TOOL_TYPE` value for a finger.
pub const MT_TOOL_FINGER: i32 = 0;

/// Tracking ids wrap at this mask.
pub const TRACKING_ID_MAX: u16 = 0xFFFF;

/// Absolute axis event.
pub fn abs(code: AbsoluteAxisCode, value: i32) -> InputEvent {
    AbsoluteAxisEvent::new(code, value).into()
}

/// Key event, 1 when pressed and 0 when released.
pub fn key(code: KeyCode, pressed: bool) -> InputEvent {
    KeyEvent::new(code, i32::from(pressed)).into()
}

/// Frame terminator.
pub fn syn_report() -> InputEvent {
    SynchronizationEvent::new(SynchronizationCode::SYN_REPORT, 0).into()
}

/// Type, code and value of an event.
pub fn raw_parts(event: &InputEvent) -> (u16, u16, i32) {
    (event.event_type().0, event.code(), event.value())
}

pub fn is_syn_report(event: &InputEvent) -> bool {
    event.event_type() == EventType::SYNCHRONIZATION
        && event.code() == SynchronizationCode::SYN_REPORT.0
}

/// One-line, evtest-style rendering of an event.
pub fn describe(event: &InputEvent) -> String {
    let (_, code, value) = raw_parts(event);
    match event.event_type() {
        EventType::SYNCHRONIZATION => format!("{:?} {}", SynchronizationCode(code), value),
        EventType::KEY => format!("{:?} {}", KeyCode::new(code), value),
        EventType::ABSOLUTE => format!("{:?} {}", AbsoluteAxisCode(code), value),
        other => format!("{:?} {:#06x} {}", other, code, value),
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct SlotState {
    tracking_id: Option<u16>,
    x: Option<i32>,
    y: Option<i32>,
}

/// Stateful multi-touch protocol B encoder for one device.
///
/// # Examples
///
/// ```
/// use evdev::AbsoluteAxisCode;
/// use touchpoll_core::TouchId;
/// use touchpoll_hardware::config::TouchscreenConfig;
/// use touchpoll_hardware::evdev::{EvdevEncoder, is_syn_report, raw_parts};
/// use touchpoll_hardware::frame::FrameRecorder;
/// use touchpoll_hardware::traits::MultiTouchSink;
/// use touchpoll_hardware::types::DeviceDescriptor;
///
/// let descriptor = DeviceDescriptor::from_config(&TouchscreenConfig::default());
/// let mut encoder = EvdevEncoder::new(&descriptor);
///
/// let mut recorder = FrameRecorder::new();
/// recorder.activate_slot(TouchId::new(0).unwrap(), 300, 150);
/// recorder.sync_frame();
///
/// let events = encoder.encode(&recorder.take_frame().unwrap());
/// assert_eq!(raw_parts(&events[0]), (3, AbsoluteAxisCode::ABS_MT_TRACKING_ID.0, 0));
/// assert!(is_syn_report(events.last().unwrap()));
/// ```
#[derive(Debug, Clone)]
pub struct EvdevEncoder {
    slots: Vec<SlotState>,
    reported_slot: usize,
    next_tracking_id: u16,
    touching: bool,
    pointer_x: Option<i32>,
    pointer_y: Option<i32>,
}

impl EvdevEncoder {
    pub fn new(descriptor: &DeviceDescriptor) -> Self {
        Self {
            slots: vec![SlotState::default(); descriptor.max_slots],
            reported_slot: 0,
            next_tracking_id: 0,
            touching: false,
            pointer_x: None,
            pointer_y: None,
        }
    }

    /// Number of slots currently holding a contact.
    pub fn active_contacts(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.tracking_id.is_some())
            .count()
    }

    /// Encode one frame, updating the device state.
    pub fn encode(&mut self, frame: &TouchFrame) -> Vec<InputEvent> {
        let mut events = Vec::new();

        for event in &frame.events {
            let slot = event.slot().index();
            if slot >= self.slots.len() {
                continue;
            }
            match *event {
                SlotEvent::Activate { x, y, .. } => {
                    self.activate(&mut events, slot, i32::from(x), i32::from(y))
                }
                SlotEvent::Release { .. } => self.release(&mut events, slot),
            }
        }

        self.emulate_pointer(&mut events);

        if !events.is_empty() {
            events.push(syn_report());
        }
        events
    }

    fn activate(&mut self, events: &mut Vec<InputEvent>, slot: usize, x: i32, y: i32) {
        if self.slots[slot].tracking_id.is_none() {
            let id = self.allocate_tracking_id();
            self.select(events, slot);
            events.push(abs(AbsoluteAxisCode::ABS_MT_TRACKING_ID, i32::from(id)));
            events.push(abs(AbsoluteAxisCode::ABS_MT_TOOL_TYPE, MT_TOOL_FINGER));
            self.slots[slot].tracking_id = Some(id);
        }

        if self.slots[slot].x != Some(x) {
            self.select(events, slot);
            events.push(abs(AbsoluteAxisCode::ABS_MT_POSITION_X, x));
            self.slots[slot].x = Some(x);
        }
        if self.slots[slot].y != Some(y) {
            self.select(events, slot);
            events.push(abs(AbsoluteAxisCode::ABS_MT_POSITION_Y, y));
            self.slots[slot].y = Some(y);
        }
    }

    fn release(&mut self, events: &mut Vec<InputEvent>, slot: usize) {
        if self.slots[slot].tracking_id.is_none() {
            return;
        }
        self.select(events, slot);
        events.push(abs(AbsoluteAxisCode::ABS_MT_TRACKING_ID, -1));
        self.slots[slot] = SlotState::default();
    }

    /// Emit `ABS_MT_SLOT` if `slot` is not the last one reported.
    fn select(&mut self, events: &mut Vec<InputEvent>, slot: usize) {
        if self.reported_slot != slot {
            events.push(abs(AbsoluteAxisCode::ABS_MT_SLOT, slot as i32));
            self.reported_slot = slot;
        }
    }

    fn allocate_tracking_id(&mut self) -> u16 {
        let id = self.next_tracking_id;
        self.next_tracking_id = self.next_tracking_id.wrapping_add(1) & TRACKING_ID_MAX;
        id
    }

    /// The contact that has been down the longest.
    fn oldest_contact(&self) -> Option<&SlotState> {
        let mut oldest: Option<(&SlotState, u16)> = None;
        for slot in &self.slots {
            let Some(id) = slot.tracking_id else {
                continue;
            };
            let age = self.next_tracking_id.wrapping_sub(id) & TRACKING_ID_MAX;
            if oldest.is_none_or(|(_, best)| age > best) {
                oldest = Some((slot, age));
            }
        }
        oldest.map(|(slot, _)| slot)
    }

    fn emulate_pointer(&mut self, events: &mut Vec<InputEvent>) {
        let oldest = self.oldest_contact().copied();

        let touching = oldest.is_some();
        if touching != self.touching {
            events.push(key(KeyCode::BTN_TOUCH, touching));
            self.touching = touching;
        }

        let Some(contact) = oldest else {
            return;
        };
        if let Some(x) = contact.x
            && self.pointer_x != Some(x)
        {
            events.push(abs(AbsoluteAxisCode::ABS_X, x));
            self.pointer_x = Some(x);
        }
        if let Some(y) = contact.y
            && self.pointer_y != Some(y)
        {
            events.push(abs(AbsoluteAxisCode::ABS_Y, y));
            self.pointer_y = Some(y);
        }
    }
}
