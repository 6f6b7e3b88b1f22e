//! Newline-delimited JSON input source.
//!
//! Reads one [`RawInputEvent`] per line from a blocking reader on a dedicated
//! thread and forwards it into the Tokio channel.  Blank lines are skipped;
//! lines that fail to parse are logged and skipped.
//!
//! Stopping is cooperative: the thread checks the stop flag between lines, so
//! a reader blocked in `read` (an idle stdin, say) exits on its next line or
//! at end of input.

use std::io::BufRead;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{CaptureError, InputSource, RawInputEvent};

/// An [`InputSource`] over any line-oriented reader.
pub struct NdjsonInputSource<R> {
    reader: Mutex<Option<R>>,
    stopped: Arc<AtomicBool>,
}

impl<R> NdjsonInputSource<R>
where
    R: BufRead + Send + 'static,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader: Mutex::new(Some(reader)),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl<R> InputSource for NdjsonInputSource<R>
where
    R: BufRead + Send + 'static,
{
    fn start(&self) -> Result<mpsc::UnboundedReceiver<RawInputEvent>, CaptureError> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| CaptureError::StartFailed("reader lock poisoned".into()))?
            .take()
            .ok_or(CaptureError::AlreadyStarted)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let stopped = Arc::clone(&self.stopped);

        thread::Builder::new()
            .name("ndjson-input".into())
            .spawn(move || read_lines(reader, &tx, &stopped))
            .map_err(|e| CaptureError::StartFailed(e.to_string()))?;

        Ok(rx)
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }
}

fn read_lines<R: BufRead>(
    reader: R,
    tx: &mpsc::UnboundedSender<RawInputEvent>,
    stopped: &AtomicBool,
) {
    for (index, line) in reader.lines().enumerate() {
        if stopped.load(Ordering::Relaxed) {
            break;
        }
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("input read failed: {e}");
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<RawInputEvent>(trimmed) {
            Ok(event) => {
                if tx.send(event).is_err() {
                    break;
                }
            }
            Err(e) => warn!(line = index + 1, "skipping unparseable input event: {e}"),
        }
    }
    debug!("input source exhausted");
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::infrastructure::input_capture::{KeySample, PointerSample};

    #[tokio::test]
    async fn test_ndjson_source_yields_events_in_order_then_ends() {
        // Arrange
        let input = concat!(
            r#"{"type":"mousedown","offsetX":1,"offsetY":2,"buttons":1}"#,
            "\n\n",
            r#"{"type":"keydown","key":"Enter","code":"Enter"}"#,
            "\n",
        );
        let source = NdjsonInputSource::new(Cursor::new(input));

        // Act
        let mut rx = source.start().expect("start");

        // Assert
        assert_eq!(
            rx.recv().await,
            Some(RawInputEvent::MouseDown(PointerSample {
                offset_x: 1.0,
                offset_y: 2.0,
                buttons: 1,
            }))
        );
        assert_eq!(
            rx.recv().await,
            Some(RawInputEvent::KeyDown(KeySample {
                key: "Enter".into(),
                code: "Enter".into(),
            }))
        );
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_ndjson_source_skips_malformed_lines() {
        let input = "garbage\n{\"type\":\"keyup\",\"key\":\"a\"}\n";
        let source = NdjsonInputSource::new(Cursor::new(input));

        let mut rx = source.start().expect("start");

        assert!(matches!(rx.recv().await, Some(RawInputEvent::KeyUp(_))));
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn test_ndjson_source_can_only_start_once() {
        let source = NdjsonInputSource::new(Cursor::new(""));
        let _rx = source.start().expect("first start");

        assert!(matches!(source.start(), Err(CaptureError::AlreadyStarted)));
    }

    #[test]
    fn test_read_lines_stops_when_flagged() {
        // Arrange
        let input = "{\"type\":\"keyup\",\"key\":\"a\"}\n";
        let (tx, mut rx) = mpsc::unbounded_channel();
        let stopped = AtomicBool::new(true);

        // Act
        read_lines(Cursor::new(input), &tx, &stopped);

        // Assert
        assert!(rx.try_recv().is_err());
    }
}
