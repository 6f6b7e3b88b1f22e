//! JSON signaling over a WebSocket.
//!
//! The WebSocket is split into its sink and stream halves, each owned by a
//! spawned task:
//!
//! ```text
//! driver ──send()──▶ mpsc ──▶ [writer task] ──Text frame──▶ remote
//! driver ◀──recv()── mpsc ◀── [reader task] ◀──Text frame── remote
//! ```
//!
//! The driver never touches the socket directly, so `send` never blocks and
//! `recv` is cancel-safe (it is just an `mpsc` receive).

use anyhow::Context;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    tungstenite::{Error as WsError, Message as WsMessage},
    WebSocketStream,
};
use tracing::{debug, warn};

use crate::application::{SignalingError, SignalingTransport};
use crate::domain::{InboundSignal, OutboundSignal};

/// A [`SignalingTransport`] speaking JSON text frames over a WebSocket.
pub struct WsSignalingTransport {
    outgoing: mpsc::UnboundedSender<OutboundSignal>,
    incoming: mpsc::UnboundedReceiver<Result<InboundSignal, SignalingError>>,
    reader: JoinHandle<()>,
}

impl WsSignalingTransport {
    /// Connects to the signaling endpoint at `url` (`ws://` or `wss://`).
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP connection or the WebSocket handshake fails.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use emu_session::infrastructure::WsSignalingTransport;
    ///
    /// # async fn example() -> anyhow::Result<()> {
    /// let transport = WsSignalingTransport::connect("ws://127.0.0.1:8080/signal").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let (ws_stream, _response) = tokio_tungstenite::connect_async(url)
            .await
            .with_context(|| format!("failed to connect to signaling endpoint {url}"))?;
        debug!("signaling connected to {url}");
        Ok(Self::from_stream(ws_stream))
    }

    /// Wraps an already-established WebSocket.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn from_stream<S>(ws_stream: WebSocketStream<S>) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (mut sink, mut stream) = ws_stream.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<OutboundSignal>();
        let (in_tx, in_rx) = mpsc::unbounded_channel();

        // Writer: runs until the transport is dropped, so a final `bye` queued
        // just before drop is still delivered.
        tokio::spawn(async move {
            while let Some(signal) = out_rx.recv().await {
                let json = match serde_json::to_string(&signal) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!("signaling: cannot serialize {}: {e}", signal.type_name());
                        continue;
                    }
                };
                debug!("signaling → remote: {}", signal.type_name());
                if let Err(e) = sink.send(WsMessage::Text(json)).await {
                    debug!("signaling: send failed: {e}");
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let reader = tokio::spawn(async move {
            loop {
                let frame = match stream.next().await {
                    Some(Ok(frame)) => frame,
                    Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) | None => {
                        debug!("signaling: remote closed the WebSocket");
                        break;
                    }
                    Some(Err(e)) => {
                        let _ = in_tx.send(Err(SignalingError::Transport(e.to_string())));
                        break;
                    }
                };

                let parsed = match frame {
                    WsMessage::Text(text) => serde_json::from_str::<InboundSignal>(&text)
                        .map_err(|e| SignalingError::Malformed(e.to_string())),
                    WsMessage::Close(_) => {
                        debug!("signaling: Close frame received");
                        break;
                    }
                    WsMessage::Binary(_) => {
                        Err(SignalingError::Malformed("unexpected binary frame".into()))
                    }
                    // Ping/Pong are answered by tungstenite itself.
                    WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => continue,
                };

                if let Ok(signal) = &parsed {
                    debug!("signaling ← remote: {}", signal.type_name());
                }
                if in_tx.send(parsed).is_err() {
                    // Transport dropped.
                    break;
                }
            }
        });

        Self {
            outgoing: out_tx,
            incoming: in_rx,
            reader,
        }
    }
}

#[async_trait]
impl SignalingTransport for WsSignalingTransport {
    fn send(&mut self, signal: OutboundSignal) -> Result<(), SignalingError> {
        self.outgoing.send(signal).map_err(|_| SignalingError::Closed)
    }

    async fn recv(&mut self) -> Option<Result<InboundSignal, SignalingError>> {
        self.incoming.recv().await
    }
}

impl Drop for WsSignalingTransport {
    fn drop(&mut self) {
        // The writer drains and exits once `outgoing` is dropped.
        self.reader.abort();
    }
}
