//! Question-progress tracking.

/// Derives "questions asked so far" from the number of assistant turns
/// observed, capped at the known question-list length.
///
/// In generation mode the total is unknown and the tracker is constructed
/// with a total of zero, which makes it inert.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    current: usize,
    total: usize,
}

impl ProgressTracker {
    /// Creates a tracker for a fixed question list of `total` questions.
    pub fn new(total: usize) -> Self {
        Self { current: 0, total }
    }

    /// Records one assistant turn.
    ///
    /// The counter never exceeds the known total, even if the engine emits
    /// more assistant turns than expected. This is a clamp, not an error.
    pub fn on_assistant_turn(&mut self) {
        if self.current < self.total {
            self.current += 1;
        }
    }

    /// Questions asked so far.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Total questions in the fixed list (zero in generation mode).
    pub fn total(&self) -> usize {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_assistant_turns() {
        let mut progress = ProgressTracker::new(3);
        assert_eq!((progress.current(), progress.total()), (0, 3));

        progress.on_assistant_turn();
        progress.on_assistant_turn();
        assert_eq!(progress.current(), 2);
    }

    #[test]
    fn test_clamps_at_total() {
        let mut progress = ProgressTracker::new(3);
        for _ in 0..5 {
            progress.on_assistant_turn();
        }
        assert_eq!(progress.current(), 3);
    }

    #[test]
    fn test_inert_with_zero_total() {
        let mut progress = ProgressTracker::new(0);
        progress.on_assistant_turn();
        assert_eq!((progress.current(), progress.total()), (0, 0));
    }
}
