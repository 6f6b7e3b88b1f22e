//! Dispatcher: forwards adapter output to an [`InputChannel`].
//!
//! The stream name is derived from the event variant (`"mouse"`,
//! `"keyboard"`, `"touch"`).  Nothing is buffered or transformed here; a send
//! that fails drops the event, and the outcome is tallied in
//! [`DispatchStats`].

use emu_core::DeviceEvent;
use emu_session::{InputChannel, SendError};
use tracing::{debug, warn};

/// Outcome counters since the dispatcher was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub sent: u64,
    /// Dropped because the session was not ready yet.
    pub dropped_not_ready: u64,
    /// Dropped because the renegotiation queue was full.
    pub dropped_backpressure: u64,
    /// Dropped for any other reason (closed session, channel error, ...).
    pub failed: u64,
}

impl DispatchStats {
    pub fn dropped(&self) -> u64 {
        self.dropped_not_ready + self.dropped_backpressure + self.failed
    }
}

#[derive(Debug, Default)]
pub struct Dispatcher {
    stats: DispatchStats,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Sends `event` on its stream.
    ///
    /// # Errors
    ///
    /// Returns the channel's [`SendError`] after counting it; the event is
    /// not retried.
    pub fn dispatch<C>(&mut self, channel: &mut C, event: &DeviceEvent) -> Result<(), SendError>
    where
        C: InputChannel + ?Sized,
    {
        let stream = event.stream_name();
        let result = channel.send(stream, event);
        match &result {
            Ok(()) => self.stats.sent += 1,
            Err(SendError::NotReady { .. }) => {
                self.stats.dropped_not_ready += 1;
                debug!(stream, "dropping event: session not ready");
            }
            Err(e @ SendError::Backpressure { .. }) => {
                self.stats.dropped_backpressure += 1;
                warn!(stream, "dropping event: {e}");
            }
            Err(e) => {
                self.stats.failed += 1;
                warn!(stream, "dropping event: {e}");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use emu_core::{KeyEvent, MouseEvent, TouchEvent};

    use super::*;

    /// Records every send and replies from a scripted queue (default `Ok`).
    #[derive(Default)]
    struct ScriptedChannel {
        sends: Vec<(String, DeviceEvent)>,
        replies: VecDeque<Result<(), SendError>>,
    }

    impl InputChannel for ScriptedChannel {
        fn send(&mut self, stream: &str, event: &DeviceEvent) -> Result<(), SendError> {
            self.sends.push((stream.to_string(), event.clone()));
            self.replies.pop_front().unwrap_or(Ok(()))
        }
    }

    #[test]
    fn test_dispatch_routes_each_variant_to_its_stream() {
        // Arrange
        let mut channel = ScriptedChannel::default();
        let mut dispatcher = Dispatcher::new();

        // Act
        for event in [
            DeviceEvent::Mouse(MouseEvent::default()),
            DeviceEvent::Key(KeyEvent::down("a")),
            DeviceEvent::Touch(TouchEvent::default()),
        ] {
            dispatcher.dispatch(&mut channel, &event).expect("sent");
        }

        // Assert
        let streams: Vec<&str> = channel.sends.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(streams, vec!["mouse", "keyboard", "touch"]);
        assert_eq!(dispatcher.stats().sent, 3);
    }

    #[test]
    fn test_dispatch_counts_each_failure_kind() {
        // Arrange
        let mut channel = ScriptedChannel {
            replies: VecDeque::from([
                Err(SendError::NotReady {
                    stream: "mouse".into(),
                }),
                Err(SendError::Backpressure {
                    stream: "mouse".into(),
                    depth: 64,
                }),
                Err(SendError::Closed),
                Ok(()),
            ]),
            ..ScriptedChannel::default()
        };
        let mut dispatcher = Dispatcher::new();
        let event = DeviceEvent::Mouse(MouseEvent::default());

        // Act
        let results: Vec<_> = (0..4)
            .map(|_| dispatcher.dispatch(&mut channel, &event))
            .collect();

        // Assert
        assert!(results[0].is_err() && results[1].is_err() && results[2].is_err());
        assert!(results[3].is_ok());
        assert_eq!(
            dispatcher.stats(),
            DispatchStats {
                sent: 1,
                dropped_not_ready: 1,
                dropped_backpressure: 1,
                failed: 1,
            }
        );
        assert_eq!(dispatcher.stats().dropped(), 3);
    }

    #[test]
    fn test_dispatch_accepts_trait_objects() {
        let mut channel = ScriptedChannel::default();
        let dyn_channel: &mut dyn InputChannel = &mut channel;
        let mut dispatcher = Dispatcher::new();

        dispatcher
            .dispatch(dyn_channel, &DeviceEvent::Key(KeyEvent::up("Enter")))
            .expect("sent");

        assert_eq!(channel.sends.len(), 1);
    }
}
