//! Wire messages as the emulator's controller service declares them.
//!
//! Field numbers mirror `emulator_controller.proto`.  Only the fields the
//! codec fills are ever non-zero; the rest are declared so that a record
//! produced by the emulator's own tooling decodes without loss of meaning.

/// Mouse record sent on the "mouse" stream.
#[derive(Clone, PartialEq, prost::Message)]
pub struct MouseEvent {
    #[prost(int32, tag = "1")]
    pub x: i32,
    #[prost(int32, tag = "2")]
    pub y: i32,
    #[prost(int32, tag = "3")]
    pub buttons: i32,
    #[prost(int32, tag = "4")]
    pub display: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum KeyEventType {
    Keydown = 0,
    Keyup = 1,
    Keypress = 2,
}

/// Keyboard record sent on the "keyboard" stream.
#[derive(Clone, PartialEq, prost::Message)]
pub struct KeyboardEvent {
    #[prost(int32, tag = "1")]
    pub code_type: i32,
    #[prost(enumeration = "KeyEventType", tag = "2")]
    pub event_type: i32,
    #[prost(int32, tag = "3")]
    pub key_code: i32,
    #[prost(string, tag = "4")]
    pub key: String,
    #[prost(string, tag = "5")]
    pub text: String,
}

/// One contact inside a [`TouchEvent`].
///
/// The emulator keys contacts by `identifier`; there is no slot field.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Touch {
    #[prost(int32, tag = "1")]
    pub x: i32,
    #[prost(int32, tag = "2")]
    pub y: i32,
    #[prost(int32, tag = "3")]
    pub identifier: i32,
    #[prost(int32, tag = "4")]
    pub pressure: i32,
    #[prost(int32, tag = "5")]
    pub touch_major: i32,
    #[prost(int32, tag = "6")]
    pub touch_minor: i32,
    #[prost(int32, tag = "7")]
    pub expiration: i32,
    #[prost(int32, tag = "8")]
    pub orientation: i32,
}

/// Touch record sent on the "touch" stream.
#[derive(Clone, PartialEq, prost::Message)]
pub struct TouchEvent {
    #[prost(message, repeated, tag = "1")]
    pub touches: Vec<Touch>,
    #[prost(int32, tag = "2")]
    pub display: i32,
}
