//! Completed-step bookkeeping.

use std::collections::HashMap;

/// How a step left the pending set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Done,
    Skipped,
}

impl StepOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            StepOutcome::Done => "done",
            StepOutcome::Skipped => "skipped",
        }
    }
}

/// Snapshot of an episode's step counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Steps marked done.
    pub completed: usize,
    /// Steps explicitly skipped.
    pub skipped: usize,
    /// Steps required to finish.
    pub total: usize,
}

impl Progress {
    /// Steps that count toward completion.
    pub fn finished(&self) -> usize {
        self.completed + self.skipped
    }

    /// Fraction of the episode finished, in `0.0..=1.0`. An episode with no
    /// steps counts as fully finished.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.finished() as f64 / self.total as f64
        }
    }
}

/// Set of steps finished in the current episode.
///
/// Holds at most `total` entries; once full, further insertions are ignored
/// until [`StepTracker::clear`].
#[derive(Debug, Clone)]
pub(crate) struct StepTracker {
    total: usize,
    steps: HashMap<String, StepOutcome>,
}

impl StepTracker {
    pub(crate) fn new(total: usize) -> Self {
        Self {
            total,
            steps: HashMap::with_capacity(total),
        }
    }

    pub(crate) fn total(&self) -> usize {
        self.total
    }

    pub(crate) fn len(&self) -> usize {
        self.steps.len()
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.steps.len() >= self.total
    }

    /// Records `id`. Returns false without recording anything if the episode
    /// is already finished. Re-recording an id keeps its first outcome.
    pub(crate) fn insert(&mut self, id: String, outcome: StepOutcome) -> bool {
        if self.is_finished() {
            return false;
        }
        self.steps.entry(id).or_insert(outcome);
        true
    }

    pub(crate) fn clear(&mut self) {
        self.steps.clear();
    }

    pub(crate) fn progress(&self) -> Progress {
        let skipped = self
            .steps
            .values()
            .filter(|outcome| **outcome == StepOutcome::Skipped)
            .count();
        Progress {
            completed: self.steps.len() - skipped,
            skipped,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent() {
        let mut tracker = StepTracker::new(3);
        assert!(tracker.insert("a".into(), StepOutcome::Done));
        assert!(tracker.insert("a".into(), StepOutcome::Skipped));
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.progress().completed, 1);
        assert_eq!(tracker.progress().skipped, 0);
    }

    #[test]
    fn test_never_exceeds_total() {
        let mut tracker = StepTracker::new(2);
        assert!(tracker.insert("a".into(), StepOutcome::Done));
        assert!(tracker.insert("b".into(), StepOutcome::Skipped));
        assert!(tracker.is_finished());
        assert!(!tracker.insert("c".into(), StepOutcome::Done));
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_zero_total_is_finished_from_the_start() {
        let mut tracker = StepTracker::new(0);
        assert!(tracker.is_finished());
        assert!(!tracker.insert("a".into(), StepOutcome::Done));
        assert_eq!(tracker.progress().fraction(), 1.0);
    }

    #[test]
    fn test_clear_starts_over() {
        let mut tracker = StepTracker::new(1);
        tracker.insert("a".into(), StepOutcome::Done);
        tracker.clear();
        assert!(!tracker.is_finished());
        assert!(tracker.insert("a".into(), StepOutcome::Done));
    }

    #[test]
    fn test_progress_fraction() {
        let mut tracker = StepTracker::new(4);
        tracker.insert("a".into(), StepOutcome::Done);
        tracker.insert("b".into(), StepOutcome::Skipped);
        let progress = tracker.progress();
        assert_eq!(progress.finished(), 2);
        assert_eq!(progress.total, 4);
        assert!((progress.fraction() - 0.5).abs() < f64::EPSILON);
    }
}
