//! Bounded classification log
//!
//! Entries are kept newest-first. Once [`HISTORY_CAPACITY`] entries are held,
//! recording a new one drops the oldest.

use heapless::Deque;
use rand::Rng;

use crate::clock::Clock;
use crate::types::{ClassificationState, HistoryEntry};

/// Maximum number of logged classifications
pub const HISTORY_CAPACITY: usize = 10;

/// Newest-first ring of recent classifications.
#[derive(Clone, Debug)]
pub struct HistoryBuffer {
    entries: Deque<HistoryEntry, HISTORY_CAPACITY>,
    record_probability: f64,
    correct_probability: f64,
}

impl HistoryBuffer {
    /// Create an empty log.
    ///
    /// Both probabilities must already be validated to lie in [0, 1].
    #[must_use]
    pub fn new(record_probability: f64, correct_probability: f64) -> Self {
        Self {
            entries: Deque::new(),
            record_probability,
            correct_probability,
        }
    }

    /// Record the classification with probability `record_probability`.
    pub fn maybe_record<R, C>(
        &mut self,
        classification: &ClassificationState,
        rng: &mut R,
        clock: &C,
    ) -> Option<HistoryEntry>
    where
        R: Rng + ?Sized,
        C: Clock + ?Sized,
    {
        if rng.gen_bool(self.record_probability) {
            Some(self.record(classification, rng, clock))
        } else {
            None
        }
    }

    /// Record the classification unconditionally.
    ///
    /// The correctness flag stands in for a ground-truth comparison and is
    /// drawn true with probability `correct_probability`.
    pub fn record<R, C>(
        &mut self,
        classification: &ClassificationState,
        rng: &mut R,
        clock: &C,
    ) -> HistoryEntry
    where
        R: Rng + ?Sized,
        C: Clock + ?Sized,
    {
        let entry = HistoryEntry {
            timestamp: clock.wall_time(),
            label: classification.label,
            confidence_percent: classification.confidence_percent(),
            correct: rng.gen_bool(self.correct_probability),
        };
        if self.entries.is_full() {
            self.entries.pop_back();
        }
        // Room was made above, so this cannot be rejected.
        let _ = self.entries.push_front(entry);
        entry
    }

    /// Drop every entry
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry
    #[must_use]
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    /// Entries from newest to oldest
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> + '_ {
        self.entries.iter()
    }

    /// Copy the entries (newest first) into a fixed-capacity vector.
    #[must_use]
    pub fn to_vec(&self) -> heapless::Vec<HistoryEntry, HISTORY_CAPACITY> {
        self.entries.iter().copied().collect()
    }
}
