//! emu-session library crate.
//!
//! Negotiates and maintains the real-time data channels that carry encoded
//! device events to a remote emulator.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! remote emulator (offer / candidates / bye over signaling)
//!         ↕
//! [emu-session]
//!   ├── domain/           Pure types: signaling messages, SessionState, SessionConfig
//!   ├── application/      SessionDriver state machine and its ports
//!   │                     (SignalingTransport, PeerConnection, InputChannel)
//!   └── infrastructure/
//!         ├── ws_signaling/  JSON-over-WebSocket transport (tokio-tungstenite)
//!         └── mock/          In-memory transport and peer for tests
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async.
//! - `application` depends on `domain` and `emu-core`; I/O happens only
//!   through the port traits.
//! - `infrastructure` implements the ports with `tokio` and `tungstenite`.

/// Domain layer: pure signaling and session types (no I/O).
pub mod domain;

/// Application layer: the session driver and its ports.
pub mod application;

/// Infrastructure layer: signaling transports and test doubles.
pub mod infrastructure;

pub use application::{
    InputChannel, PeerConnection, PeerConnectionState, PeerError, PeerEvent, SendError,
    SessionDriver, SessionError, SessionEvent, SignalingError, SignalingTransport,
};
pub use domain::{
    IceCandidate, IceServer, InboundSignal, OutboundSignal, RtcConfiguration, SessionConfig,
    SessionDescription, SessionState,
};
