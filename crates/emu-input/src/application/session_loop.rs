//! The single event loop that owns a session.
//!
//! One task waits on three things at once: the next raw input event, the
//! next signaling/peer event, and the shutdown future.  Capture, encoding,
//! dispatch and state transitions all happen on this task, so none of the
//! state is shared or locked.
//!
//! ```text
//!            ┌── subscription.recv() ─▶ adapter.handle ─▶ dispatcher.dispatch ─▶ driver.send
//! select! ───┼── driver.next_event() ─▶ driver.handle
//!            └── shutdown
//! ```

use std::future::Future;

use emu_session::{
    InputChannel, PeerConnection, SessionDriver, SessionError, SessionState, SignalingTransport,
};
use tracing::{debug, info, warn};

use crate::application::capture::InputCaptureAdapter;
use crate::application::dispatch::{DispatchStats, Dispatcher};
use crate::infrastructure::input_capture::{CaptureSubscription, InputSource};

/// Why [`run_session`] returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionExit {
    /// The shutdown future completed.
    Shutdown,
    /// The input source ran dry.
    InputEnded,
    /// The remote or the peer ended the session.
    Closed,
}

/// Summary handed back when the loop ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub exit: SessionExit,
    pub final_state: SessionState,
    pub stats: DispatchStats,
}

/// Starts `driver` and pumps input into it until shutdown, end of input, or
/// session teardown.
///
/// On every exit path the touch slots are released, the driver is closed
/// and the input source is stopped (by dropping `subscription`).
///
/// # Errors
///
/// [`SessionError`] if the session fails to start or negotiation fails.
pub async fn run_session<T, P, S, F>(
    mut driver: SessionDriver<T, P>,
    mut subscription: CaptureSubscription<S>,
    mut adapter: InputCaptureAdapter,
    shutdown: F,
) -> Result<SessionReport, SessionError>
where
    T: SignalingTransport,
    P: PeerConnection,
    S: InputSource,
    F: Future<Output = ()>,
{
    let mut dispatcher = Dispatcher::new();
    let outcome = pump(&mut driver, &mut subscription, &mut adapter, &mut dispatcher, shutdown).await;

    adapter.release_all();
    driver.close();
    drop(subscription);

    let stats = dispatcher.stats();
    info!(
        session = %driver.id(),
        sent = stats.sent,
        dropped = stats.dropped(),
        "session loop finished"
    );
    outcome.map(|exit| SessionReport {
        exit,
        final_state: driver.state(),
        stats,
    })
}

async fn pump<T, P, S, F>(
    driver: &mut SessionDriver<T, P>,
    subscription: &mut CaptureSubscription<S>,
    adapter: &mut InputCaptureAdapter,
    dispatcher: &mut Dispatcher,
    shutdown: F,
) -> Result<SessionExit, SessionError>
where
    T: SignalingTransport,
    P: PeerConnection,
    S: InputSource,
    F: Future<Output = ()>,
{
    driver.start()?;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => {
                info!(session = %driver.id(), "shutdown requested");
                return Ok(SessionExit::Shutdown);
            }
            raw = subscription.recv() => {
                let Some(raw) = raw else {
                    debug!(session = %driver.id(), "input source ended");
                    return Ok(SessionExit::InputEnded);
                };
                if let Some(event) = adapter.handle(&raw) {
                    // Failures are counted and logged by the dispatcher.
                    let _ = dispatcher.dispatch(driver, &event);
                }
            }
            event = driver.next_event() => {
                let Some(event) = event else {
                    return Ok(SessionExit::Closed);
                };
                driver.handle(event)?;
                if driver.state() == SessionState::Closed {
                    warn!(session = %driver.id(), "session closed by remote");
                    return Ok(SessionExit::Closed);
                }
            }
        }
    }
}

/// Runs captured input through the adapter into `channel` until the source
/// ends, with no session involved.
///
/// Touch slots are released and the source stopped when this returns.
pub async fn replay<S, C>(
    mut subscription: CaptureSubscription<S>,
    mut adapter: InputCaptureAdapter,
    channel: &mut C,
) -> DispatchStats
where
    S: InputSource,
    C: InputChannel + ?Sized,
{
    let mut dispatcher = Dispatcher::new();
    while let Some(raw) = subscription.recv().await {
        if let Some(event) = adapter.handle(&raw) {
            let _ = dispatcher.dispatch(channel, &event);
        }
    }
    adapter.release_all();
    dispatcher.stats()
}
