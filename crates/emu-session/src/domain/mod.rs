//! Domain layer for emu-session.
//!
//! Pure types with no dependencies on I/O or async runtimes:
//!
//! - Signaling messages exchanged with the remote emulator
//! - The session lifecycle states
//! - Session configuration

pub mod config;
pub mod signal;
pub mod state;

pub use config::SessionConfig;
pub use signal::{
    IceCandidate, IceServer, InboundSignal, OutboundSignal, RtcConfiguration, SessionDescription,
};
pub use state::SessionState;
