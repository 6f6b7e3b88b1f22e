//! Infrastructure layer for emu-input.
//!
//! Contains the adapters at the edges: input sources, the TOML config file,
//! and a payload printer used for offline encoding.
//!
//! **Dependency rule**: this layer may depend on `application` types only for
//! wiring; the `application` layer imports nothing from here except the raw
//! input event types and the `InputSource` seam.

pub mod input_capture;
pub mod payload_log;
pub mod storage;
