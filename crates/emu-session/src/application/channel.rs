//! The downstream send contract used by the dispatcher.

use emu_core::DeviceEvent;
use thiserror::Error;

/// Why a device event was not sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendError {
    /// The session has not reached readiness (or the channel is not open).
    #[error("stream '{stream}' is not ready")]
    NotReady { stream: String },

    /// The renegotiation queue is full.
    #[error("stream '{stream}' is backpressured ({depth} sends queued)")]
    Backpressure { stream: String, depth: usize },

    /// No data channel is configured for this logical stream.
    #[error("unknown stream '{0}'")]
    UnknownStream(String),

    /// The session has been torn down.
    #[error("session is closed")]
    Closed,

    /// The data channel refused the payload.
    #[error("stream '{stream}' send failed: {reason}")]
    Channel { stream: String, reason: String },
}

/// Something that accepts encoded device events on named logical streams.
pub trait InputChannel {
    /// Encodes `event` and sends it on `stream`, preserving per-stream order.
    ///
    /// # Errors
    ///
    /// Returns [`SendError`] when the event was not accepted.
    fn send(&mut self, stream: &str, event: &DeviceEvent) -> Result<(), SendError>;
}
