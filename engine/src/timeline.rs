//! One-shot timers ordered by due time.

use std::collections::BTreeMap;
use std::time::Duration;

/// Pending events keyed by `(due, schedule order)`.
///
/// Events due at the same instant fire in the order they were scheduled.
/// Clearing the timeline cancels everything still pending.
#[derive(Debug, Clone)]
pub struct Timeline<E> {
    entries: BTreeMap<(Duration, u64), E>,
    next_seq: u64,
}

impl<E> Timeline<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_seq: 0,
        }
    }

    pub fn schedule(&mut self, due: Duration, event: E) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.entries.insert((due, seq), event);
    }

    /// Remove and return the earliest event due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, E)> {
        if self.next_due()? > now {
            return None;
        }
        self.entries.pop_first().map(|((due, _), event)| (due, event))
    }

    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.entries.keys().next().map(|(due, _)| *due)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E> Default for Timeline<E> {
    fn default() -> Self {
        Self::new()
    }
}
