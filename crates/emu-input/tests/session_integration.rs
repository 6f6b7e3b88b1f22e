//! Integration tests for the session loop: captured input driving a live
//! session over the in-memory signaling transport and peer connection.
//!
//! The loop and a scripted remote run concurrently on the same task via
//! `tokio::join!`; `settle()` yields so the loop drains whatever is ready.

use std::future::Future;

use emu_core::{decode_event, CaptureSurface, DeviceEvent, DeviceResolution, EventKind};
use emu_input::application::{
    run_session, InputCaptureAdapter, SessionExit, SessionReport,
};
use emu_input::infrastructure::input_capture::mock::MockInputSource;
use emu_input::infrastructure::input_capture::{
    CaptureSubscription, KeySample, PointerSample, RawInputEvent,
};
use emu_session::infrastructure::mock::{
    MockPeerConnection, MockPeerHandle, MockSignalingRemote, MockSignalingTransport,
};
use emu_session::{
    InboundSignal, OutboundSignal, PeerEvent, SessionConfig, SessionDescription, SessionDriver,
    SessionError, SessionState, SignalingError,
};
use tokio::sync::oneshot;

struct Harness {
    remote: MockSignalingRemote,
    peer: MockPeerHandle,
    input: MockInputSource,
}

/// Builds a loop future plus the handles that play the remote, the peer
/// stack and the input surface.
fn start(
    shutdown: oneshot::Receiver<()>,
) -> (
    impl Future<Output = Result<SessionReport, SessionError>>,
    Harness,
) {
    let (transport, remote) = MockSignalingTransport::new();
    let (peer_conn, peer) = MockPeerConnection::new();
    let driver = SessionDriver::new(transport, peer_conn, SessionConfig::default());

    let input = MockInputSource::new();
    let subscription = CaptureSubscription::attach(input.clone()).expect("attach");
    let adapter = InputCaptureAdapter::new(
        CaptureSurface::new(540, 960),
        DeviceResolution::new(1080, 1920),
        10,
    )
    .expect("valid geometry");

    let session = run_session(driver, subscription, adapter, async move {
        let _ = shutdown.await;
    });
    (session, Harness { remote, peer, input })
}

async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

impl Harness {
    async fn negotiate(&self) {
        settle().await;
        assert_eq!(self.remote.sent(), vec![OutboundSignal::RequestSession]);
        self.remote
            .push(InboundSignal::Offer(SessionDescription::new("v=0 offer")));
        settle().await;
        self.peer
            .emit(PeerEvent::AnswerCreated(SessionDescription::new("v=0 answer")));
        self.peer.open_channels(["mouse", "keyboard", "touch"]);
        settle().await;
    }
}

fn press(offset: f64, buttons: u8) -> PointerSample {
    PointerSample {
        offset_x: offset,
        offset_y: offset,
        buttons,
    }
}

#[tokio::test]
async fn test_input_flows_to_the_peer_once_connected() {
    // Arrange
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let (session, h) = start(shutdown_rx);

    // Act
    let script = async {
        h.negotiate().await;
        h.input.inject_event(RawInputEvent::MouseDown(press(10.0, 1)));
        h.input.inject_event(RawInputEvent::MouseUp(press(20.0, 0)));
        h.input.inject_event(RawInputEvent::KeyDown(KeySample {
            key: "Enter".into(),
            code: "Enter".into(),
        }));
        settle().await;
        let _ = shutdown_tx.send(());
    };
    let (report, ()) = tokio::join!(session, script);

    // Assert
    let report = report.expect("clean exit");
    assert_eq!(report.exit, SessionExit::Shutdown);
    assert_eq!(report.final_state, SessionState::Closed);
    assert_eq!(report.stats.sent, 3);

    let sent = h.peer.log().sent;
    let labels: Vec<&str> = sent.iter().map(|(l, _)| l.as_str()).collect();
    assert_eq!(labels, vec!["mouse", "mouse", "keyboard"]);
    assert!(matches!(
        decode_event(EventKind::Mouse, &sent[0].1),
        Ok(DeviceEvent::Mouse(m)) if (m.x, m.y) == (20, 20)
    ));
}

#[tokio::test]
async fn test_input_before_readiness_is_dropped_and_counted() {
    // Arrange
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let (session, h) = start(shutdown_rx);

    // Act
    let script = async {
        settle().await;
        h.input.inject_event(RawInputEvent::MouseDown(press(1.0, 1)));
        settle().await;
        let _ = shutdown_tx.send(());
    };
    let (report, ()) = tokio::join!(session, script);

    // Assert
    let report = report.expect("clean exit");
    assert_eq!(report.stats.sent, 0);
    assert_eq!(report.stats.dropped_not_ready, 1);
    assert!(h.peer.log().sent.is_empty());
}

#[tokio::test]
async fn test_teardown_stops_input_and_says_bye() {
    // Arrange
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let (session, h) = start(shutdown_rx);

    // Act
    let script = async {
        h.negotiate().await;
        let _ = shutdown_tx.send(());
    };
    let (report, ()) = tokio::join!(session, script);

    // Assert
    assert_eq!(report.expect("clean exit").final_state, SessionState::Closed);
    assert!(!h.input.is_running());
    assert_eq!(h.input.stop_count(), 1);
    assert_eq!(h.peer.log().close_calls, 1);
    assert_eq!(h.remote.sent().last(), Some(&OutboundSignal::Bye));
}

#[tokio::test]
async fn test_remote_bye_ends_the_loop() {
    let (_shutdown_tx, shutdown_rx) = oneshot::channel();
    let (session, h) = start(shutdown_rx);

    let script = async {
        h.negotiate().await;
        h.remote.push(InboundSignal::Bye);
    };
    let (report, ()) = tokio::join!(session, script);

    let report = report.expect("clean exit");
    assert_eq!(report.exit, SessionExit::Closed);
    assert!(!h.input.is_running());
}

#[tokio::test]
async fn test_end_of_input_ends_the_loop() {
    let (_shutdown_tx, shutdown_rx) = oneshot::channel();
    let (session, h) = start(shutdown_rx);

    h.input.finish();
    let report = session.await.expect("clean exit");

    assert_eq!(report.exit, SessionExit::InputEnded);
    assert_eq!(report.final_state, SessionState::Closed);
}

#[tokio::test]
async fn test_transport_failure_surfaces_negotiation_failed() {
    // Arrange
    let (_shutdown_tx, shutdown_rx) = oneshot::channel();
    let (session, h) = start(shutdown_rx);

    // Act
    let script = async {
        settle().await;
        h.remote
            .push_error(SignalingError::Transport("connection reset".into()));
    };
    let (result, ()) = tokio::join!(session, script);

    // Assert
    assert!(matches!(result, Err(SessionError::NegotiationFailed(_))));
    assert!(!h.input.is_running());
    assert_eq!(h.peer.log().close_calls, 1);
}
