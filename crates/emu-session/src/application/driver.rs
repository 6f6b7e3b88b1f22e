//! SessionDriver: negotiates the emulator's input data channels and gates
//! sends on their readiness.
//!
//! One driver owns one session.  It is driven from a single task:
//!
//! ```text
//! loop {
//!     let event = driver.next_event().await?;   // signaling or peer
//!     driver.handle(event)?;                    // state transition
//!     driver.send("touch", &event)              // interleaved freely
//! }
//! ```
//!
//! # Candidate ordering
//!
//! Remote candidates are only consumable once the remote offer has been
//! applied; local candidates only once the answer has gone out.  Each
//! direction has its own FIFO queue, drained in arrival order as soon as the
//! corresponding description is in place and discarded on teardown.
//!
//! # Renegotiation
//!
//! A new offer while `Connected` moves back to `Negotiating` without closing
//! the open channels.  Sends made in that window are queued (up to
//! `max_queued_sends`) and flushed in order once the session is ready again.

use std::collections::{BTreeSet, VecDeque};

use emu_core::{encode_event, DeviceEvent};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::application::channel::{InputChannel, SendError};
use crate::application::pending::PendingCandidates;
use crate::application::ports::{
    PeerConnection, PeerConnectionState, PeerEvent, SignalingError, SignalingTransport,
};
use crate::domain::{
    IceCandidate, InboundSignal, OutboundSignal, RtcConfiguration, SessionConfig,
    SessionDescription, SessionState,
};

/// Errors surfaced to the owner of the driver.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The session moved to `Failed`.  Not retried.
    #[error("negotiation failed: {0}")]
    NegotiationFailed(String),

    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: SessionState,
    },
}

/// Input to [`SessionDriver::handle`], produced by [`SessionDriver::next_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Signal(InboundSignal),
    Peer(PeerEvent),
    TransportError(SignalingError),
    /// The signaling transport closed.
    TransportClosed,
    /// The peer connection stopped producing events.
    PeerEnded,
}

impl SessionEvent {
    /// Events that move a session under way to `Failed`.
    fn is_failure(&self) -> bool {
        match self {
            SessionEvent::TransportError(SignalingError::Malformed(_)) => false,
            SessionEvent::TransportError(_) | SessionEvent::TransportClosed => true,
            SessionEvent::Peer(PeerEvent::Error(_)) => true,
            SessionEvent::Peer(PeerEvent::StateChanged(PeerConnectionState::Failed)) => true,
            _ => false,
        }
    }
}

#[derive(Debug)]
struct QueuedSend {
    stream: String,
    label: String,
    payload: Vec<u8>,
}

/// The session state machine.
pub struct SessionDriver<T, P> {
    id: Uuid,
    config: SessionConfig,
    state: SessionState,
    transport: T,
    peer: P,
    /// A session request is outstanding (cleared by the next offer).
    session_requested: bool,
    /// An offer has been handed to the peer and its answer is pending.
    offer_in_flight: bool,
    /// Offer received while another was being applied.
    pending_offer: Option<SessionDescription>,
    remote_description_set: bool,
    answer_sent: bool,
    renegotiating: bool,
    inbound_candidates: PendingCandidates,
    outbound_candidates: PendingCandidates,
    open_channels: BTreeSet<String>,
    queued_sends: VecDeque<QueuedSend>,
}

impl<T, P> SessionDriver<T, P>
where
    T: SignalingTransport,
    P: PeerConnection,
{
    pub fn new(transport: T, peer: P, config: SessionConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            state: SessionState::Idle,
            transport,
            peer,
            session_requested: false,
            offer_in_flight: false,
            pending_offer: None,
            remote_description_set: false,
            answer_sent: false,
            renegotiating: false,
            inbound_candidates: PendingCandidates::new(),
            outbound_candidates: PendingCandidates::new(),
            open_channels: BTreeSet::new(),
            queued_sends: VecDeque::new(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// `true` while sends go straight to the data channels.
    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Connected
    }

    pub fn is_channel_open(&self, label: &str) -> bool {
        self.open_channels.contains(label)
    }

    /// Sends waiting for renegotiation to finish.
    pub fn queued_sends(&self) -> usize {
        self.queued_sends.len()
    }

    /// Remote candidates waiting for the remote description.
    pub fn pending_inbound_candidates(&self) -> usize {
        self.inbound_candidates.len()
    }

    /// Local candidates waiting for the answer to go out.
    pub fn pending_outbound_candidates(&self) -> usize {
        self.outbound_candidates.len()
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Requests a session from the remote: `Idle → Negotiating`.
    ///
    /// # Errors
    ///
    /// [`SessionError::InvalidTransition`] unless `Idle`;
    /// [`SessionError::NegotiationFailed`] if the request cannot be sent.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::InvalidTransition {
                action: "start",
                state: self.state,
            });
        }
        self.transition(SessionState::Negotiating);
        self.request_session()
    }

    /// Tears the session down.  Valid from any state; a no-op once `Closed`.
    ///
    /// Buffered candidates and queued sends are discarded, `bye` is sent on a
    /// best-effort basis if a session was under way, and the peer connection
    /// is closed.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        let in_session = matches!(self.state, SessionState::Negotiating | SessionState::Connected);
        self.discard_pending();
        if in_session {
            if let Err(e) = self.transport.send(OutboundSignal::Bye) {
                debug!(session = %self.id, "bye not delivered: {e}");
            }
        }
        // `fail` has already closed the peer.
        if self.state != SessionState::Failed {
            self.peer.close();
        }
        self.open_channels.clear();
        self.transition(SessionState::Closed);
    }

    /// Waits for the next signaling message or peer event.
    ///
    /// Returns `None` once the session is `Failed` or `Closed`.  Cancel-safe:
    /// dropping the future loses nothing.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        if self.state.is_terminal() {
            return None;
        }
        tokio::select! {
            signal = self.transport.recv() => Some(match signal {
                Some(Ok(signal)) => SessionEvent::Signal(signal),
                Some(Err(e)) => SessionEvent::TransportError(e),
                None => SessionEvent::TransportClosed,
            }),
            event = self.peer.next_event() => Some(match event {
                Some(event) => SessionEvent::Peer(event),
                None => SessionEvent::PeerEnded,
            }),
        }
    }

    /// Applies one event to the state machine.
    ///
    /// Events arriving after teardown are ignored.
    ///
    /// # Errors
    ///
    /// [`SessionError::NegotiationFailed`] when the event moved the session
    /// to `Failed`.
    pub fn handle(&mut self, event: SessionEvent) -> Result<(), SessionError> {
        if self.state.is_terminal() {
            debug!(session = %self.id, state = %self.state, "ignoring {event:?} after teardown");
            return Ok(());
        }
        if self.state == SessionState::Idle && event.is_failure() {
            // Failed is only reachable from a session under way.
            warn!(session = %self.id, "ignoring {event:?} before start");
            return Ok(());
        }
        match event {
            SessionEvent::Signal(signal) => self.on_signal(signal),
            SessionEvent::Peer(event) => self.on_peer_event(event),
            SessionEvent::TransportError(SignalingError::Malformed(reason)) => {
                warn!(session = %self.id, "dropping malformed signaling message: {reason}");
                Ok(())
            }
            SessionEvent::TransportError(e) => Err(self.fail(e.to_string())),
            SessionEvent::TransportClosed => Err(self.fail("signaling transport closed".into())),
            SessionEvent::PeerEnded => {
                info!(session = %self.id, "peer connection ended");
                self.close();
                Ok(())
            }
        }
    }

    // ── Sending ───────────────────────────────────────────────────────────────

    /// Encodes `event` and sends it on the channel mapped to `stream`.
    ///
    /// # Errors
    ///
    /// See [`SendError`]; nothing is sent or queued on error.
    pub fn send(&mut self, stream: &str, event: &DeviceEvent) -> Result<(), SendError> {
        self.send_payload(stream, encode_event(event))
    }

    /// Sends an already-encoded payload on the channel mapped to `stream`.
    ///
    /// # Errors
    ///
    /// See [`SendError`].
    pub fn send_payload(&mut self, stream: &str, payload: Vec<u8>) -> Result<(), SendError> {
        match self.state {
            SessionState::Failed | SessionState::Closed => return Err(SendError::Closed),
            SessionState::Idle => {
                return Err(SendError::NotReady {
                    stream: stream.to_string(),
                })
            }
            SessionState::Negotiating | SessionState::Connected => {}
        }

        let label = self
            .config
            .label_for(stream)
            .ok_or_else(|| SendError::UnknownStream(stream.to_string()))?
            .to_string();

        if self.state == SessionState::Negotiating {
            if !self.renegotiating {
                return Err(SendError::NotReady {
                    stream: stream.to_string(),
                });
            }
            if self.queued_sends.len() >= self.config.max_queued_sends {
                return Err(SendError::Backpressure {
                    stream: stream.to_string(),
                    depth: self.queued_sends.len(),
                });
            }
            self.queued_sends.push_back(QueuedSend {
                stream: stream.to_string(),
                label,
                payload,
            });
            return Ok(());
        }

        if !self.open_channels.contains(&label) {
            return Err(SendError::NotReady {
                stream: stream.to_string(),
            });
        }
        self.peer
            .send(&label, payload)
            .map_err(|e| SendError::Channel {
                stream: stream.to_string(),
                reason: e.to_string(),
            })
    }

    // ── Signaling events ──────────────────────────────────────────────────────

    fn on_signal(&mut self, signal: InboundSignal) -> Result<(), SessionError> {
        debug!(session = %self.id, state = %self.state, "signal: {}", signal.type_name());
        match signal {
            InboundSignal::Start(config) => self.on_start(&config),
            InboundSignal::Offer(offer) => self.on_offer(offer),
            InboundSignal::Candidate(candidate) => {
                self.on_remote_candidate(candidate);
                Ok(())
            }
            InboundSignal::Bye => {
                info!(session = %self.id, "remote ended the session");
                self.close();
                Ok(())
            }
        }
    }

    fn on_start(&mut self, config: &RtcConfiguration) -> Result<(), SessionError> {
        let before_first_offer = self.state == SessionState::Negotiating
            && !self.offer_in_flight
            && !self.remote_description_set;
        if !before_first_offer {
            warn!(session = %self.id, state = %self.state, "ignoring start outside initial negotiation");
            return Ok(());
        }
        match self.peer.configure(config) {
            Ok(()) => {
                debug!(session = %self.id, servers = config.ice_servers.len(), "peer configured");
                Ok(())
            }
            Err(e) => Err(self.fail(e.to_string())),
        }
    }

    fn on_offer(&mut self, offer: SessionDescription) -> Result<(), SessionError> {
        match self.state {
            SessionState::Idle => {
                warn!(session = %self.id, "ignoring offer before start");
                Ok(())
            }
            SessionState::Negotiating if self.offer_in_flight => {
                if self.pending_offer.replace(offer).is_some() {
                    warn!(session = %self.id, "superseding a held offer");
                }
                debug!(session = %self.id, "offer held until the current one is answered");
                Ok(())
            }
            SessionState::Negotiating => self.apply_offer(offer),
            SessionState::Connected => {
                info!(session = %self.id, "renegotiating");
                self.renegotiating = true;
                self.transition(SessionState::Negotiating);
                self.apply_offer(offer)
            }
            SessionState::Failed | SessionState::Closed => Ok(()),
        }
    }

    fn apply_offer(&mut self, offer: SessionDescription) -> Result<(), SessionError> {
        self.session_requested = false;
        if offer.is_empty() {
            return Err(self.fail("malformed remote description: empty sdp".into()));
        }
        self.remote_description_set = false;
        self.answer_sent = false;
        self.offer_in_flight = true;
        if let Err(e) = self.peer.apply_offer(&offer) {
            return Err(self.fail(e.to_string()));
        }
        Ok(())
    }

    fn on_remote_candidate(&mut self, candidate: IceCandidate) {
        if self.remote_description_set {
            self.apply_remote_candidate(&candidate);
        } else {
            self.inbound_candidates.push(candidate);
            debug!(
                session = %self.id,
                buffered = self.inbound_candidates.len(),
                "remote candidate buffered"
            );
        }
    }

    fn apply_remote_candidate(&mut self, candidate: &IceCandidate) {
        // A single bad candidate does not doom the session; ICE tries the rest.
        if let Err(e) = self.peer.add_remote_candidate(candidate) {
            warn!(session = %self.id, "remote candidate rejected: {e}");
        }
    }

    // ── Peer events ───────────────────────────────────────────────────────────

    fn on_peer_event(&mut self, event: PeerEvent) -> Result<(), SessionError> {
        match event {
            PeerEvent::AnswerCreated(answer) => self.on_answer(answer),
            PeerEvent::LocalCandidate(candidate) => self.on_local_candidate(candidate),
            PeerEvent::ChannelOpen(label) => {
                debug!(session = %self.id, %label, "data channel open");
                self.open_channels.insert(label);
                self.check_ready();
                Ok(())
            }
            PeerEvent::ChannelClosed(label) => {
                let required = self.config.required_labels().contains(label.as_str());
                self.open_channels.remove(&label);
                if required {
                    warn!(session = %self.id, %label, "required data channel closed");
                } else {
                    debug!(session = %self.id, %label, "data channel closed");
                }
                Ok(())
            }
            PeerEvent::StateChanged(state) => self.on_connection_state(state),
            PeerEvent::Error(e) => Err(self.fail(e.to_string())),
        }
    }

    fn on_answer(&mut self, answer: SessionDescription) -> Result<(), SessionError> {
        if !self.offer_in_flight {
            warn!(session = %self.id, "ignoring answer with no offer in flight");
            return Ok(());
        }
        if let Err(e) = self.transport.send(OutboundSignal::Answer(answer)) {
            return Err(self.fail(e.to_string()));
        }
        self.offer_in_flight = false;
        self.remote_description_set = true;
        self.answer_sent = true;
        debug!(session = %self.id, "answer sent");

        for candidate in self.inbound_candidates.take_all() {
            self.apply_remote_candidate(&candidate);
        }
        for candidate in self.outbound_candidates.take_all() {
            if let Err(e) = self.transport.send(OutboundSignal::Candidate(candidate)) {
                return Err(self.fail(e.to_string()));
            }
        }

        if let Some(next) = self.pending_offer.take() {
            return self.apply_offer(next);
        }
        self.check_ready();
        Ok(())
    }

    fn on_local_candidate(&mut self, candidate: IceCandidate) -> Result<(), SessionError> {
        if !self.answer_sent {
            self.outbound_candidates.push(candidate);
            return Ok(());
        }
        match self.transport.send(OutboundSignal::Candidate(candidate)) {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fail(e.to_string())),
        }
    }

    fn on_connection_state(&mut self, state: PeerConnectionState) -> Result<(), SessionError> {
        match state {
            PeerConnectionState::Failed => Err(self.fail("ice connection failed".into())),
            PeerConnectionState::Closed => {
                info!(session = %self.id, "peer connection closed");
                self.close();
                Ok(())
            }
            PeerConnectionState::Disconnected => {
                warn!(session = %self.id, "peer connection disconnected");
                Ok(())
            }
            other => {
                debug!(session = %self.id, "peer connection state {other:?}");
                Ok(())
            }
        }
    }

    // ── Transitions ───────────────────────────────────────────────────────────

    fn request_session(&mut self) -> Result<(), SessionError> {
        if self.session_requested {
            return Ok(());
        }
        if let Err(e) = self.transport.send(OutboundSignal::RequestSession) {
            return Err(self.fail(e.to_string()));
        }
        self.session_requested = true;
        Ok(())
    }

    /// `Negotiating → Connected` once the answer is out and every required
    /// channel is open.
    fn check_ready(&mut self) {
        if self.state != SessionState::Negotiating || !self.answer_sent || self.offer_in_flight {
            return;
        }
        let all_open = self
            .config
            .required_labels()
            .iter()
            .all(|label| self.open_channels.contains(*label));
        if !all_open {
            return;
        }
        self.renegotiating = false;
        self.transition(SessionState::Connected);
        self.flush_queued_sends();
    }

    fn flush_queued_sends(&mut self) {
        while let Some(queued) = self.queued_sends.pop_front() {
            if !self.open_channels.contains(&queued.label) {
                warn!(session = %self.id, stream = %queued.stream, "dropping queued send: channel closed");
                continue;
            }
            if let Err(e) = self.peer.send(&queued.label, queued.payload) {
                warn!(session = %self.id, stream = %queued.stream, "dropping queued send: {e}");
            }
        }
    }

    fn fail(&mut self, reason: String) -> SessionError {
        error!(session = %self.id, state = %self.state, "session failed: {reason}");
        self.discard_pending();
        self.peer.close();
        self.open_channels.clear();
        self.transition(SessionState::Failed);
        SessionError::NegotiationFailed(reason)
    }

    fn discard_pending(&mut self) {
        self.inbound_candidates.clear();
        self.outbound_candidates.clear();
        self.queued_sends.clear();
        self.pending_offer = None;
        self.offer_in_flight = false;
        self.session_requested = false;
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            info!(session = %self.id, from = %self.state, to = %next, "session state");
            self.state = next;
        }
    }
}

impl<T, P> InputChannel for SessionDriver<T, P>
where
    T: SignalingTransport,
    P: PeerConnection,
{
    fn send(&mut self, stream: &str, event: &DeviceEvent) -> Result<(), SendError> {
        SessionDriver::send(self, stream, event)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
