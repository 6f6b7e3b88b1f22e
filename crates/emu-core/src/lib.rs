//! # emu-core
//!
//! Shared library for Emu-Input containing the device-event model, the wire
//! codec, capture-surface geometry and the touch slot tracker.
//!
//! It has zero dependencies on OS APIs, async runtimes, or network sockets,
//! so every rule here can be unit-tested in isolation.
//!
//! # Architecture overview (for beginners)
//!
//! Emu-Input captures local pointer, keyboard and multi-touch input and sends
//! it to a remote device emulator over a negotiated data channel.  The
//! emulator reproduces the input as if it came from a physical touchscreen
//! and keyboard.
//!
//! This crate (`emu-core`) is the shared foundation.  It defines:
//!
//! - **`protocol`** – What travels over the data channel.  A [`DeviceEvent`]
//!   is encoded into the emulator's protobuf record (via `prost`), in which
//!   every zero-valued field is omitted.
//!
//! - **`domain`** – Pure rules with no I/O.  [`SurfaceGeometry`] maps
//!   capture-surface coordinates onto the device resolution and
//!   [`SlotTracker`] binds ephemeral touch identifiers to the device's fixed
//!   pool of touch slots.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `emu_core::DeviceEvent` instead of `emu_core::protocol::messages::DeviceEvent`.
pub use domain::geometry::{CaptureSurface, ConfigurationError, DeviceResolution, SurfaceGeometry};
pub use domain::slots::{Slot, SlotTracker, TrackerError};
pub use protocol::codec::{decode_event, encode_event, ProtocolError};
pub use protocol::messages::{
    ButtonMask, DeviceEvent, EventKind, KeyEvent, MouseEvent, TouchContact, TouchEvent,
};
