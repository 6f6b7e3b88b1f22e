//! Session configuration.
//!
//! [`SessionConfig`] is a plain struct; the binary fills it from its TOML
//! config file and tests build it directly.

use std::collections::{BTreeMap, BTreeSet};

use emu_core::EventKind;
use serde::{Deserialize, Serialize};

/// Runtime settings for one [`crate::SessionDriver`].
///
/// # Example
///
/// ```rust
/// use emu_session::SessionConfig;
///
/// let cfg = SessionConfig::default();
/// assert_eq!(cfg.label_for("touch"), Some("touch"));
/// assert_eq!(cfg.max_queued_sends, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Sends accepted while renegotiating, before `Backpressure` is returned.
    #[serde(default = "default_max_queued_sends")]
    pub max_queued_sends: usize,

    /// Logical stream name → data channel label on the peer connection.
    ///
    /// Every label in this map must be open before the session is `Connected`.
    #[serde(default = "default_channels")]
    pub channels: BTreeMap<String, String>,
}

fn default_max_queued_sends() -> usize {
    64
}

fn default_channels() -> BTreeMap<String, String> {
    EventKind::ALL
        .iter()
        .map(|k| (k.stream_name().to_string(), k.stream_name().to_string()))
        .collect()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_queued_sends: default_max_queued_sends(),
            channels: default_channels(),
        }
    }
}

impl SessionConfig {
    /// Data channel label for a logical stream.
    pub fn label_for(&self, stream: &str) -> Option<&str> {
        self.channels.get(stream).map(String::as_str)
    }

    /// Labels that must be open for the session to be ready.
    pub fn required_labels(&self) -> BTreeSet<&str> {
        self.channels.values().map(String::as_str).collect()
    }
}
