//! Device-event types carried over the emulator's input data channels.
//!
//! Each logical stream ("mouse", "keyboard", "touch") carries exactly one
//! record type.  Coordinates are already scaled to the device resolution by
//! the time a record is built.

use serde::{Deserialize, Serialize};

// ── Protocol constants ────────────────────────────────────────────────────────

/// Largest encodable touch pressure (`1.0` after normalization).
pub const PRESSURE_MAX: i16 = 0x7fff;

/// Number of concurrent touch slots the device exposes by default.
pub const DEFAULT_SLOT_COUNT: usize = 10;

/// Logical stream carrying [`MouseEvent`] records.
pub const MOUSE_STREAM: &str = "mouse";
/// Logical stream carrying [`KeyEvent`] records.
pub const KEYBOARD_STREAM: &str = "keyboard";
/// Logical stream carrying [`TouchEvent`] records.
pub const TOUCH_STREAM: &str = "touch";

// ── Event kinds ───────────────────────────────────────────────────────────────

/// Discriminant of a [`DeviceEvent`], one per logical stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Mouse,
    Keyboard,
    Touch,
}

impl EventKind {
    /// All kinds, in stream declaration order.
    pub const ALL: [EventKind; 3] = [EventKind::Mouse, EventKind::Keyboard, EventKind::Touch];

    /// Name of the logical stream this kind is sent on.
    pub fn stream_name(self) -> &'static str {
        match self {
            EventKind::Mouse => MOUSE_STREAM,
            EventKind::Keyboard => KEYBOARD_STREAM,
            EventKind::Touch => TOUCH_STREAM,
        }
    }

    /// Looks up the kind for a logical stream name.
    pub fn from_stream_name(name: &str) -> Option<Self> {
        EventKind::ALL.into_iter().find(|k| k.stream_name() == name)
    }
}

// ── Mouse ─────────────────────────────────────────────────────────────────────

/// Bitset of pressed mouse buttons, using the DOM `buttons` bit layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ButtonMask(pub u8);

impl ButtonMask {
    pub const NONE: u8 = 0x00;
    pub const LEFT: u8 = 0x01;
    pub const RIGHT: u8 = 0x02;
    pub const MIDDLE: u8 = 0x04;
    pub const BACK: u8 = 0x08;
    pub const FORWARD: u8 = 0x10;

    /// Returns `true` if no button is held.
    pub fn is_empty(self) -> bool {
        self.0 == Self::NONE
    }

    /// Returns `true` if every bit in `flag` is set.
    pub fn contains(self, flag: u8) -> bool {
        self.0 & flag == flag
    }
}

/// A pointer sample scaled to device coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MouseEvent {
    pub buttons: ButtonMask,
    pub x: i32,
    pub y: i32,
}

// ── Keyboard ──────────────────────────────────────────────────────────────────

/// A single key transition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyEvent {
    /// DOM key value, e.g. `"Enter"` or `"a"`.
    pub key_code: String,
    /// `true` for key-down, `false` for key-up.
    pub down: bool,
}

impl KeyEvent {
    pub fn down(key_code: impl Into<String>) -> Self {
        Self {
            key_code: key_code.into(),
            down: true,
        }
    }

    pub fn up(key_code: impl Into<String>) -> Self {
        Self {
            key_code: key_code.into(),
            down: false,
        }
    }
}

// ── Touch ─────────────────────────────────────────────────────────────────────

/// One live contact within a [`TouchEvent`].
///
/// `pressure` and `major_radius` are `None` when the normalized value is zero;
/// the codec never emits such fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TouchContact {
    pub slot: u32,
    pub tracking_id: i32,
    pub x: i32,
    pub y: i32,
    pub pressure: Option<i16>,
    pub major_radius: Option<i16>,
}

/// Snapshot of every live contact, ordered by slot ascending.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TouchEvent {
    pub contacts: Vec<TouchContact>,
}

impl TouchEvent {
    /// Builds a snapshot, ordering `contacts` by slot.
    pub fn new(mut contacts: Vec<TouchContact>) -> Self {
        contacts.sort_by_key(|c| c.slot);
        Self { contacts }
    }

    /// Returns `true` when no contact is live (for example after the last lift).
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}

// ── Top-level event ───────────────────────────────────────────────────────────

/// Canonical device-event record produced by the input capture adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "event", rename_all = "lowercase")]
pub enum DeviceEvent {
    Mouse(MouseEvent),
    Key(KeyEvent),
    Touch(TouchEvent),
}

impl DeviceEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DeviceEvent::Mouse(_) => EventKind::Mouse,
            DeviceEvent::Key(_) => EventKind::Keyboard,
            DeviceEvent::Touch(_) => EventKind::Touch,
        }
    }

    /// Name of the logical stream this event is sent on.
    pub fn stream_name(&self) -> &'static str {
        self.kind().stream_name()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
