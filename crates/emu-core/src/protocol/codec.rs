//! Wire codec for [`DeviceEvent`] records.
//!
//! Records are the emulator's protobuf messages (see [`wire`]), so the remote
//! end parses them with its generated types:
//!
//! ```text
//! MouseEvent    { 1: x, 2: y, 3: buttons }
//! KeyboardEvent { 2: event_type (0 = keydown, 1 = keyup), 4: key }
//! TouchEvent    { 1: repeated Touch }
//! Touch         { 1: x, 2: y, 3: identifier, 4: pressure, 5: touch_major }
//! ```
//!
//! Invariant: a scalar field is present on the wire iff its value is
//! non-zero.  Zero values, empty strings and `None` are never written, and an
//! absent field decodes as zero (`None` for the optional touch fields).  The
//! `Option<i16>` touch fields map `None` to `0` on encode and `0` back to
//! `None` on decode, so re-encoding a decoded record is byte-identical.
//!
//! A contact's slot is local to the sender and is not carried; the tracking
//! id goes out as the emulator's `identifier`.
//!
//! Each logical stream carries one record type, so there is no envelope: the
//! caller supplies the [`EventKind`] when decoding.
//!
//! [`wire`]: crate::protocol::wire

use prost::Message;
use thiserror::Error;

use crate::protocol::messages::{
    ButtonMask, DeviceEvent, EventKind, KeyEvent, MouseEvent, TouchContact, TouchEvent,
};
use crate::protocol::wire;

/// Errors that can occur while decoding a record.  Encoding is total.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The bytes are not a well-formed protobuf record.
    #[error("malformed record: {0}")]
    Decode(#[from] prost::DecodeError),

    /// A decoded value does not fit the device-event model.
    #[error("field `{field}` value {value} is out of range")]
    ValueOutOfRange { field: &'static str, value: i64 },
}

/// Encodes a [`DeviceEvent`] into its wire record.
///
/// Touch contacts are written in the order they are stored; build snapshots
/// with [`TouchEvent::new`] to get slot order.
///
/// # Examples
///
/// ```rust
/// use emu_core::{decode_event, encode_event, ButtonMask, DeviceEvent, MouseEvent};
///
/// let event = DeviceEvent::Mouse(MouseEvent { buttons: ButtonMask(ButtonMask::LEFT), x: 540, y: 0 });
/// let bytes = encode_event(&event);
/// // y is zero and therefore absent: [x tag, 540 as varint, buttons tag, 1]
/// assert_eq!(bytes, vec![0x08, 0x9c, 0x04, 0x18, 0x01]);
/// assert_eq!(decode_event(event.kind(), &bytes).unwrap(), event);
/// ```
pub fn encode_event(event: &DeviceEvent) -> Vec<u8> {
    match event {
        DeviceEvent::Mouse(m) => to_wire_mouse(m).encode_to_vec(),
        DeviceEvent::Key(k) => to_wire_key(k).encode_to_vec(),
        DeviceEvent::Touch(t) => to_wire_touch(t).encode_to_vec(),
    }
}

/// Decodes a wire record of the given kind.
///
/// Unknown fields are skipped.  When a scalar field repeats, the last value
/// wins.  Decoded contacts are numbered by position, since slots are not on
/// the wire.
///
/// # Errors
///
/// Returns [`ProtocolError`] if the bytes are not a well-formed record or a
/// value does not fit its field.
pub fn decode_event(kind: EventKind, bytes: &[u8]) -> Result<DeviceEvent, ProtocolError> {
    match kind {
        EventKind::Mouse => from_wire_mouse(wire::MouseEvent::decode(bytes)?).map(DeviceEvent::Mouse),
        EventKind::Keyboard => from_wire_key(wire::KeyboardEvent::decode(bytes)?).map(DeviceEvent::Key),
        EventKind::Touch => from_wire_touch(wire::TouchEvent::decode(bytes)?).map(DeviceEvent::Touch),
    }
}

// ── Domain → wire ─────────────────────────────────────────────────────────────

fn to_wire_mouse(m: &MouseEvent) -> wire::MouseEvent {
    wire::MouseEvent {
        x: m.x,
        y: m.y,
        buttons: i32::from(m.buttons.0),
        ..Default::default()
    }
}

fn to_wire_key(k: &KeyEvent) -> wire::KeyboardEvent {
    let event_type = if k.down {
        wire::KeyEventType::Keydown
    } else {
        wire::KeyEventType::Keyup
    };
    wire::KeyboardEvent {
        event_type: event_type as i32,
        key: k.key_code.clone(),
        ..Default::default()
    }
}

fn to_wire_touch(t: &TouchEvent) -> wire::TouchEvent {
    wire::TouchEvent {
        touches: t.contacts.iter().map(to_wire_contact).collect(),
        ..Default::default()
    }
}

fn to_wire_contact(c: &TouchContact) -> wire::Touch {
    wire::Touch {
        x: c.x,
        y: c.y,
        identifier: c.tracking_id,
        pressure: c.pressure.map_or(0, i32::from),
        touch_major: c.major_radius.map_or(0, i32::from),
        ..Default::default()
    }
}

// ── Wire → domain ─────────────────────────────────────────────────────────────

fn from_wire_mouse(m: wire::MouseEvent) -> Result<MouseEvent, ProtocolError> {
    let buttons = u8::try_from(m.buttons).map_err(|_| ProtocolError::ValueOutOfRange {
        field: "buttons",
        value: i64::from(m.buttons),
    })?;
    Ok(MouseEvent {
        buttons: ButtonMask(buttons),
        x: m.x,
        y: m.y,
    })
}

fn from_wire_key(k: wire::KeyboardEvent) -> Result<KeyEvent, ProtocolError> {
    let down = match wire::KeyEventType::try_from(k.event_type) {
        Ok(wire::KeyEventType::Keydown) => true,
        Ok(wire::KeyEventType::Keyup) => false,
        // Keypress has no transition to map onto.
        Ok(wire::KeyEventType::Keypress) | Err(_) => {
            return Err(ProtocolError::ValueOutOfRange {
                field: "event_type",
                value: i64::from(k.event_type),
            })
        }
    };
    Ok(KeyEvent {
        key_code: k.key,
        down,
    })
}

fn from_wire_touch(t: wire::TouchEvent) -> Result<TouchEvent, ProtocolError> {
    // Wire order is preserved so that decode/encode is byte-identical.
    let contacts = t
        .touches
        .into_iter()
        .enumerate()
        .map(|(position, touch)| from_wire_contact(position, touch))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TouchEvent { contacts })
}

fn from_wire_contact(position: usize, t: wire::Touch) -> Result<TouchContact, ProtocolError> {
    Ok(TouchContact {
        slot: u32::try_from(position).unwrap_or(u32::MAX),
        tracking_id: t.identifier,
        x: t.x,
        y: t.y,
        pressure: optional_i16("pressure", t.pressure)?,
        major_radius: optional_i16("touch_major", t.touch_major)?,
    })
}

fn optional_i16(field: &'static str, v: i32) -> Result<Option<i16>, ProtocolError> {
    let v = i16::try_from(v).map_err(|_| ProtocolError::ValueOutOfRange {
        field,
        value: i64::from(v),
    })?;
    Ok((v != 0).then_some(v))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
