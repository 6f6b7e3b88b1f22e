//! An [`InputChannel`] that writes each encoded payload as a JSON line.
//!
//! Used by `emu-input encode` to run captured input through the real codec
//! without a session.  Each accepted send produces:
//!
//! ```json
//! {"stream":"touch","label":"touch","hex":"0a0c08...","event":{"kind":"touch","event":{...}}}
//! ```

use std::io::Write;

use emu_core::{encode_event, DeviceEvent};
use emu_session::{InputChannel, SendError, SessionConfig};
use serde::Serialize;

#[derive(Serialize)]
struct PayloadRecord<'a> {
    stream: &'a str,
    label: &'a str,
    hex: String,
    event: &'a DeviceEvent,
}

/// Writes one JSON record per send to `W`.
pub struct PayloadLog<W: Write> {
    out: W,
    config: SessionConfig,
}

impl<W: Write> PayloadLog<W> {
    /// Streams resolve to labels through `config`, as they would in a session.
    pub fn new(out: W, config: SessionConfig) -> Self {
        Self { out, config }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> InputChannel for PayloadLog<W> {
    fn send(&mut self, stream: &str, event: &DeviceEvent) -> Result<(), SendError> {
        let label = self
            .config
            .label_for(stream)
            .ok_or_else(|| SendError::UnknownStream(stream.to_string()))?;
        let record = PayloadRecord {
            stream,
            label,
            hex: to_hex(&encode_event(event)),
            event,
        };
        let write_err = |reason: String| SendError::Channel {
            stream: stream.to_string(),
            reason,
        };
        let line = serde_json::to_string(&record).map_err(|e| write_err(e.to_string()))?;
        writeln!(self.out, "{line}").map_err(|e| write_err(e.to_string()))
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
