//! emu-input library crate.
//!
//! Captures pointer, keyboard and touch input on a local surface, maps it to
//! the emulator's device coordinates, and forwards it over a negotiated
//! session.
//!
//! # Architecture
//!
//! ```text
//! InputSource ──RawInputEvent──▶ InputCaptureAdapter ──DeviceEvent──▶ Dispatcher
//!                                                                         │
//!                                          SessionDriver (emu-session) ◀──┘
//! ```
//!
//! The library is shared by the `emu-input` binary and the integration tests
//! in `tests/`.

pub mod application;
pub mod infrastructure;
