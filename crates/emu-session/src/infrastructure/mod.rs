//! Infrastructure layer for emu-session.
//!
//! - [`ws_signaling`]: JSON signaling over a WebSocket, with a reader task and
//!   a writer task bridged to the driver through channels
//! - [`mock`]: in-memory transport and peer connection for tests
//!
//! A production [`crate::PeerConnection`] (for example one backed by a
//! WebRTC stack) is supplied by the embedding application.

pub mod mock;
pub mod ws_signaling;

pub use ws_signaling::WsSignalingTransport;
