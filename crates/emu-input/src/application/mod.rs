//! Application layer for emu-input.
//!
//! - **`capture`**: maps raw surface input to device events (scaling, touch
//!   slots, key fallback).
//! - **`dispatch`**: sends device events on their logical stream and counts
//!   what was dropped.
//! - **`session_loop`**: the single task that drives a session from captured
//!   input, plus an offline replay path.
//!
//! Nothing here performs I/O directly; input arrives through
//! [`crate::infrastructure::input_capture::InputSource`] and output leaves
//! through [`emu_session::InputChannel`].

pub mod capture;
pub mod dispatch;
pub mod session_loop;

pub use capture::InputCaptureAdapter;
pub use dispatch::{DispatchStats, Dispatcher};
pub use session_loop::{replay, run_session, SessionExit, SessionReport};
