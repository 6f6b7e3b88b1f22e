//! Application layer for emu-session.
//!
//! The [`SessionDriver`] knows *what* to do with each signaling and peer
//! event; *how* messages move is delegated to the port traits, which the
//! infrastructure layer implements.

pub mod channel;
pub mod driver;
pub mod pending;
pub mod ports;

pub use channel::{InputChannel, SendError};
pub use driver::{SessionDriver, SessionError, SessionEvent};
pub use pending::PendingCandidates;
pub use ports::{
    PeerConnection, PeerConnectionState, PeerError, PeerEvent, SignalingError, SignalingTransport,
};
