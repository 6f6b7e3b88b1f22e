//! Ports used by the session driver.
//!
//! Both ports split into non-blocking commands (plain methods that only
//! enqueue work) and one async method that yields the next completion or
//! remote event.  The driver awaits those inside `tokio::select!`, so the
//! async methods must be cancel-safe: dropping the future before it resolves
//! must not lose an event.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    IceCandidate, InboundSignal, OutboundSignal, RtcConfiguration, SessionDescription,
};

// ── Signaling ─────────────────────────────────────────────────────────────────

/// Errors reported by a [`SignalingTransport`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignalingError {
    /// The transport is gone; nothing more can be sent or received.
    #[error("signaling transport closed")]
    Closed,

    /// One inbound message could not be parsed.  The transport stays usable.
    #[error("malformed signaling message: {0}")]
    Malformed(String),

    /// The underlying connection failed.
    #[error("signaling transport error: {0}")]
    Transport(String),
}

/// Reliable, ordered, bidirectional message channel to the remote.
#[async_trait]
pub trait SignalingTransport: Send {
    /// Queues `signal` for delivery.
    ///
    /// # Errors
    ///
    /// Returns [`SignalingError::Closed`] if the transport has shut down.
    fn send(&mut self, signal: OutboundSignal) -> Result<(), SignalingError>;

    /// Next inbound message, or `None` once the transport has closed.
    ///
    /// Must be cancel-safe.
    async fn recv(&mut self) -> Option<Result<InboundSignal, SignalingError>>;
}

// ── Peer connection ───────────────────────────────────────────────────────────

/// Errors reported by a [`PeerConnection`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeerError {
    #[error("configuration rejected: {0}")]
    Configuration(String),

    #[error("remote description rejected: {0}")]
    DescriptionRejected(String),

    #[error("remote candidate rejected: {0}")]
    CandidateRejected(String),

    #[error("data channel '{0}' is not open")]
    ChannelUnavailable(String),

    #[error("peer connection closed")]
    Closed,
}

/// Aggregate connectivity of the peer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerConnectionState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// Completions and notifications raised by a [`PeerConnection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEvent {
    /// The remote offer was applied and a local answer set; send it.
    AnswerCreated(SessionDescription),
    /// A locally gathered ICE candidate; send it after the answer.
    LocalCandidate(IceCandidate),
    /// A remote-created data channel with this label is open.
    ChannelOpen(String),
    ChannelClosed(String),
    StateChanged(PeerConnectionState),
    /// An asynchronous operation failed (for example applying an offer).
    Error(PeerError),
}

/// The real-time peer connection that owns the data channels.
#[async_trait]
pub trait PeerConnection: Send {
    /// Applies ICE server settings before negotiation starts.
    fn configure(&mut self, config: &RtcConfiguration) -> Result<(), PeerError>;

    /// Starts applying a remote offer.  The answer arrives later as
    /// [`PeerEvent::AnswerCreated`].
    fn apply_offer(&mut self, offer: &SessionDescription) -> Result<(), PeerError>;

    /// Adds a remote candidate.  Only valid once the remote description is set.
    fn add_remote_candidate(&mut self, candidate: &IceCandidate) -> Result<(), PeerError>;

    /// Sends `payload` on the data channel labelled `label`.
    fn send(&mut self, label: &str, payload: Vec<u8>) -> Result<(), PeerError>;

    /// Next peer event, or `None` once the connection is gone.
    ///
    /// Must be cancel-safe.
    async fn next_event(&mut self) -> Option<PeerEvent>;

    /// Closes every channel and the connection.  Idempotent.
    fn close(&mut self);
}
