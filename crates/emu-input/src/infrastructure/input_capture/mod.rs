//! Input capture infrastructure.
//!
//! An [`InputSource`] produces [`RawInputEvent`]s: pointer, keyboard and
//! touch transitions as the capture surface reports them, before any scaling
//! or slot assignment.  Events are delivered through a Tokio channel so the
//! session loop can `select!` on them alongside signaling.
//!
//! # Sources
//!
//! - [`ndjson::NdjsonInputSource`]: one JSON object per line from any reader
//!   (stdin, a file, a pipe from a browser bridge)
//! - [`mock::MockInputSource`]: injects synthetic events in tests
//!
//! # Scoped acquisition
//!
//! [`CaptureSubscription`] owns a started source and stops it when dropped,
//! so the source is released on every exit path of the loop that consumed it.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

pub mod mock;
pub mod ndjson;

/// A raw input event as reported by the capture surface.
///
/// The JSON form is tagged by `"type"` and uses the DOM field names:
///
/// ```json
/// {"type":"mousedown","offsetX":10.5,"offsetY":20,"buttons":1}
/// {"type":"keydown","key":"Enter","code":"Enter"}
/// {"type":"touchstart","touches":[{"identifier":0,"clientX":5,"clientY":6,"force":0.5}]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RawInputEvent {
    MouseDown(PointerSample),
    MouseUp(PointerSample),
    MouseMove(PointerSample),
    KeyDown(KeySample),
    KeyUp(KeySample),
    TouchStart(TouchSample),
    TouchMove(TouchSample),
    TouchEnd(TouchSample),
    TouchCancel(TouchSample),
}

/// Pointer position relative to the capture surface, in surface units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerSample {
    pub offset_x: f64,
    pub offset_y: f64,
    /// Buttons held *after* the transition (DOM `buttons` bitset).
    #[serde(default)]
    pub buttons: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeySample {
    /// Logical key value, e.g. `"a"` or `"Enter"`.
    #[serde(default)]
    pub key: String,
    /// Physical key position, e.g. `"KeyA"`.
    #[serde(default)]
    pub code: String,
}

/// The contacts of a touch transition.
///
/// `touches` is read with DOM `changedTouches` semantics: on `touchend` and
/// `touchcancel` it lists the lifted contacts, not the ones still down.  A
/// bridge that forwards the DOM event unchanged should also send
/// `changedTouches`, which then takes precedence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchSample {
    #[serde(default)]
    pub touches: Vec<TouchPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed_touches: Option<Vec<TouchPoint>>,
}

impl TouchSample {
    /// The contacts this transition applies to.
    pub fn changed(&self) -> &[TouchPoint] {
        self.changed_touches.as_deref().unwrap_or(&self.touches)
    }
}

/// One contact within a [`TouchSample`], in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchPoint {
    /// Stable for the contact's lifetime; single-contact sources may omit it.
    #[serde(default)]
    pub identifier: i64,
    pub client_x: f64,
    pub client_y: f64,
    #[serde(default)]
    pub radius_x: f64,
    #[serde(default)]
    pub radius_y: f64,
    /// Normalized pressure in `[0, 1]`; absent on hardware without force.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force: Option<f64>,
}

/// Error type for input capture operations.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("input source has already been started")]
    AlreadyStarted,
    #[error("failed to start input source: {0}")]
    StartFailed(String),
}

/// Trait abstracting input event production.
pub trait InputSource: Send {
    /// Starts the source and returns a receiver for captured events.
    ///
    /// The receiver yields `None` once the source is exhausted or stopped.
    fn start(&self) -> Result<mpsc::UnboundedReceiver<RawInputEvent>, CaptureError>;
    /// Stops the source and releases whatever it holds.
    fn stop(&self);
}

/// A started [`InputSource`] that is stopped when this handle is dropped.
pub struct CaptureSubscription<S: InputSource> {
    source: S,
    events: mpsc::UnboundedReceiver<RawInputEvent>,
}

impl<S: InputSource> CaptureSubscription<S> {
    /// Starts `source` and takes ownership of it.
    ///
    /// # Errors
    ///
    /// Propagates the source's [`CaptureError`].
    pub fn attach(source: S) -> Result<Self, CaptureError> {
        let events = source.start()?;
        Ok(Self { source, events })
    }

    /// The next captured event, or `None` once the source has ended.
    ///
    /// Cancel-safe.
    pub async fn recv(&mut self) -> Option<RawInputEvent> {
        self.events.recv().await
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: InputSource> Drop for CaptureSubscription<S> {
    fn drop(&mut self) {
        self.source.stop();
    }
}
