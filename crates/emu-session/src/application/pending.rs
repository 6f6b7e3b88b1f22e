//! FIFO buffer for candidates that arrive before they can be consumed.

use std::collections::VecDeque;

use crate::domain::IceCandidate;

/// Candidates held until their description is in place.
///
/// Drained in arrival order; never reordered.
#[derive(Debug, Default)]
pub struct PendingCandidates {
    queue: VecDeque<IceCandidate>,
}

impl PendingCandidates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, candidate: IceCandidate) {
        self.queue.push_back(candidate);
    }

    /// Removes and returns every buffered candidate, oldest first.
    pub fn take_all(&mut self) -> Vec<IceCandidate> {
        self.queue.drain(..).collect()
    }

    /// Discards everything (teardown).
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_all_returns_arrival_order_and_empties() {
        // Arrange
        let mut pending = PendingCandidates::new();
        for c in ["c1", "c2", "c3"] {
            pending.push(IceCandidate::new(c));
        }

        // Act
        let drained = pending.take_all();

        // Assert
        let names: Vec<&str> = drained.iter().map(|c| c.candidate.as_str()).collect();
        assert_eq!(names, vec!["c1", "c2", "c3"]);
        assert!(pending.is_empty());
    }

    #[test]
    fn test_clear_discards_buffered_candidates() {
        let mut pending = PendingCandidates::new();
        pending.push(IceCandidate::new("c1"));
        pending.clear();
        assert_eq!(pending.len(), 0);
        assert!(pending.take_all().is_empty());
    }
}
