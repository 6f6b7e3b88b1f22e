//! JSON signaling messages.
//!
//! # Message flow
//!
//! ```text
//! Client → Remote:  request_session, answer, candidate, bye
//! Remote → Client:  start, offer, candidate, bye
//! ```
//!
//! Every message is a JSON object with a `"type"` field naming the variant;
//! the payload fields sit beside it:
//!
//! ```json
//! {"type":"offer","sdp":"v=0..."}
//! {"type":"candidate","candidate":"candidate:1 1 udp ...","sdpMid":"0","sdpMLineIndex":0}
//! {"type":"start","iceServers":[{"urls":["stun:stun.l.google.com:19302"]}]}
//! {"type":"bye"}
//! ```
//!
//! Two enums keep the directions apart, so the client cannot send an offer
//! or receive a session request by mistake.

use serde::{Deserialize, Serialize};

/// An SDP session description (offer or answer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    pub sdp: String,
}

impl SessionDescription {
    pub fn new(sdp: impl Into<String>) -> Self {
        Self { sdp: sdp.into() }
    }

    /// A description with no SDP body cannot be applied.
    pub fn is_empty(&self) -> bool {
        self.sdp.trim().is_empty()
    }
}

/// One ICE candidate, in either direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(
        rename = "sdpMLineIndex",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sdp_mline_index: Option<u16>,
}

impl IceCandidate {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: None,
            sdp_mline_index: None,
        }
    }
}

/// A STUN or TURN server offered by the remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServer {
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

/// Peer connection settings pushed by the remote before its first offer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtcConfiguration {
    #[serde(default)]
    pub ice_servers: Vec<IceServer>,
}

/// Messages received from the remote over the signaling transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundSignal {
    /// ICE server configuration for the upcoming negotiation.
    Start(RtcConfiguration),
    /// A remote offer; the client must answer it.
    Offer(SessionDescription),
    /// A remote ICE candidate.
    Candidate(IceCandidate),
    /// The remote ended the session.
    Bye,
}

impl InboundSignal {
    /// Short variant name for log output (never includes SDP bodies).
    pub fn type_name(&self) -> &'static str {
        match self {
            InboundSignal::Start(_) => "start",
            InboundSignal::Offer(_) => "offer",
            InboundSignal::Candidate(_) => "candidate",
            InboundSignal::Bye => "bye",
        }
    }
}

/// Messages sent to the remote over the signaling transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundSignal {
    /// Ask the remote to start a session (it replies with an offer).
    RequestSession,
    /// The local answer to the latest remote offer.
    Answer(SessionDescription),
    /// A local ICE candidate.
    Candidate(IceCandidate),
    /// The client is tearing the session down.
    Bye,
}

impl OutboundSignal {
    pub fn type_name(&self) -> &'static str {
        match self {
            OutboundSignal::RequestSession => "request_session",
            OutboundSignal::Answer(_) => "answer",
            OutboundSignal::Candidate(_) => "candidate",
            OutboundSignal::Bye => "bye",
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
