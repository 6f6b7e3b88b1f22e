//! In-memory signaling transport and peer connection for tests.
//!
//! Each mock comes with a handle that plays the other side: the remote
//! emulator for [`MockSignalingTransport`], the WebRTC stack for
//! [`MockPeerConnection`].  Handles inject events and record every command
//! the driver issued, so tests can drive a negotiation step by step.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::application::{PeerConnection, PeerError, PeerEvent, SignalingError, SignalingTransport};
use crate::domain::{
    IceCandidate, InboundSignal, OutboundSignal, RtcConfiguration, SessionDescription,
};

// ── Signaling ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct SignalingLog {
    sent: Vec<OutboundSignal>,
    fail_sends: bool,
}

/// A [`SignalingTransport`] backed by an unbounded channel.
pub struct MockSignalingTransport {
    inbound: mpsc::UnboundedReceiver<Result<InboundSignal, SignalingError>>,
    log: Arc<Mutex<SignalingLog>>,
}

/// The remote side of a [`MockSignalingTransport`].
///
/// Dropping every clone closes the transport.
#[derive(Clone)]
pub struct MockSignalingRemote {
    inbound: mpsc::UnboundedSender<Result<InboundSignal, SignalingError>>,
    log: Arc<Mutex<SignalingLog>>,
}

impl MockSignalingTransport {
    pub fn new() -> (Self, MockSignalingRemote) {
        let (tx, rx) = mpsc::unbounded_channel();
        let log = Arc::new(Mutex::new(SignalingLog::default()));
        (
            Self {
                inbound: rx,
                log: Arc::clone(&log),
            },
            MockSignalingRemote { inbound: tx, log },
        )
    }
}

#[async_trait]
impl SignalingTransport for MockSignalingTransport {
    fn send(&mut self, signal: OutboundSignal) -> Result<(), SignalingError> {
        let mut log = self.log.lock().expect("lock poisoned");
        if log.fail_sends {
            return Err(SignalingError::Transport("injected send failure".into()));
        }
        log.sent.push(signal);
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<InboundSignal, SignalingError>> {
        self.inbound.recv().await
    }
}

impl MockSignalingRemote {
    /// Delivers `signal` to the client.
    pub fn push(&self, signal: InboundSignal) {
        // The receiver lives as long as the driver; a closed driver ignores it.
        let _ = self.inbound.send(Ok(signal));
    }

    /// Delivers a transport-level error to the client.
    pub fn push_error(&self, error: SignalingError) {
        let _ = self.inbound.send(Err(error));
    }

    /// Everything the client has sent so far.
    pub fn sent(&self) -> Vec<OutboundSignal> {
        self.log.lock().expect("lock poisoned").sent.clone()
    }

    /// Makes every subsequent client send fail.
    pub fn fail_sends(&self, fail: bool) {
        self.log.lock().expect("lock poisoned").fail_sends = fail;
    }
}

// ── Peer connection ───────────────────────────────────────────────────────────

/// Every command a [`MockPeerConnection`] received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerLog {
    pub configurations: Vec<RtcConfiguration>,
    pub offers: Vec<SessionDescription>,
    pub remote_candidates: Vec<IceCandidate>,
    pub sent: Vec<(String, Vec<u8>)>,
    pub close_calls: usize,
}

#[derive(Debug, Default)]
struct PeerControl {
    log: PeerLog,
    reject_offers: bool,
    reject_sends: bool,
}

/// A [`PeerConnection`] whose completions are injected by a [`MockPeerHandle`].
pub struct MockPeerConnection {
    events: mpsc::UnboundedReceiver<PeerEvent>,
    control: Arc<Mutex<PeerControl>>,
}

/// The WebRTC-stack side of a [`MockPeerConnection`].
#[derive(Clone)]
pub struct MockPeerHandle {
    events: mpsc::UnboundedSender<PeerEvent>,
    control: Arc<Mutex<PeerControl>>,
}

impl MockPeerConnection {
    pub fn new() -> (Self, MockPeerHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let control = Arc::new(Mutex::new(PeerControl::default()));
        (
            Self {
                events: rx,
                control: Arc::clone(&control),
            },
            MockPeerHandle {
                events: tx,
                control,
            },
        )
    }
}

#[async_trait]
impl PeerConnection for MockPeerConnection {
    fn configure(&mut self, config: &RtcConfiguration) -> Result<(), PeerError> {
        let mut control = self.control.lock().expect("lock poisoned");
        control.log.configurations.push(config.clone());
        Ok(())
    }

    fn apply_offer(&mut self, offer: &SessionDescription) -> Result<(), PeerError> {
        let mut control = self.control.lock().expect("lock poisoned");
        if control.reject_offers {
            return Err(PeerError::DescriptionRejected("injected rejection".into()));
        }
        control.log.offers.push(offer.clone());
        Ok(())
    }

    fn add_remote_candidate(&mut self, candidate: &IceCandidate) -> Result<(), PeerError> {
        let mut control = self.control.lock().expect("lock poisoned");
        control.log.remote_candidates.push(candidate.clone());
        Ok(())
    }

    fn send(&mut self, label: &str, payload: Vec<u8>) -> Result<(), PeerError> {
        let mut control = self.control.lock().expect("lock poisoned");
        if control.reject_sends {
            return Err(PeerError::ChannelUnavailable(label.to_string()));
        }
        control.log.sent.push((label.to_string(), payload));
        Ok(())
    }

    async fn next_event(&mut self) -> Option<PeerEvent> {
        self.events.recv().await
    }

    fn close(&mut self) {
        self.control.lock().expect("lock poisoned").log.close_calls += 1;
    }
}

impl MockPeerHandle {
    /// Raises `event` on the peer connection.
    pub fn emit(&self, event: PeerEvent) {
        let _ = self.events.send(event);
    }

    /// Raises [`PeerEvent::ChannelOpen`] for each label.
    pub fn open_channels<'a>(&self, labels: impl IntoIterator<Item = &'a str>) {
        for label in labels {
            self.emit(PeerEvent::ChannelOpen(label.to_string()));
        }
    }

    pub fn log(&self) -> PeerLog {
        self.control.lock().expect("lock poisoned").log.clone()
    }

    /// Makes `apply_offer` fail synchronously.
    pub fn reject_offers(&self, reject: bool) {
        self.control.lock().expect("lock poisoned").reject_offers = reject;
    }

    /// Makes `send` fail synchronously.
    pub fn reject_sends(&self, reject: bool) {
        self.control.lock().expect("lock poisoned").reject_sends = reject;
    }
}
