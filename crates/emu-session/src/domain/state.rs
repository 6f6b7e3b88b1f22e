//! Session lifecycle states.

use std::fmt;

/// Lifecycle of one negotiated session.
///
/// ```text
/// Idle ──start──▶ Negotiating ──answer sent + channels open──▶ Connected
///                     ▲                                            │
///                     └─────────────── new offer ──────────────────┘
/// Negotiating | Connected ──error──▶ Failed
/// any ──close──▶ Closed
/// ```
///
/// `Failed` and `Closed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    Negotiating,
    Connected,
    Failed,
    Closed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Failed | SessionState::Closed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Negotiating => "negotiating",
            SessionState::Connected => "connected",
            SessionState::Failed => "failed",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}
