//! Undo/redo with debounced commits.
//!
//! `present` always reflects the latest edit. History entries are only recorded when a
//! debounced commit fires, so a burst of edits becomes a single undo step.

use std::collections::VecDeque;

use serde::Serialize;

use crate::foundation::time::{Debouncer, TimeSource};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HistoryOptions {
    pub max_history: usize,
    pub debounce_ms: u64,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            max_history: 50,
            debounce_ms: 1000,
        }
    }
}

pub struct History<T, C> {
    past: VecDeque<T>,
    present: T,
    future: VecDeque<T>,
    /// Last snapshot recorded as a history point. May lag behind `present`.
    committed: T,
    /// Snapshot captured by the latest `set_with_history`, waiting for the debounce.
    pending: Option<T>,
    debounce: Debouncer,
    max_history: usize,
    clock: C,
}

impl<T, C> History<T, C>
where
    T: Clone + Serialize,
    C: TimeSource,
{
    pub fn new(initial: T, options: HistoryOptions, clock: C) -> Self {
        Self {
            past: VecDeque::new(),
            committed: initial.clone(),
            present: initial,
            future: VecDeque::new(),
            pending: None,
            debounce: Debouncer::new(options.debounce_ms),
            max_history: options.max_history,
            clock,
        }
    }

    pub fn present(&self) -> &T {
        &self.present
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn has_pending_commit(&self) -> bool {
        self.pending.is_some()
    }

    /// Replace `present` without recording anything. For high-frequency edits such as typing.
    pub fn set(&mut self, value: T) {
        self.present = value;
    }

    pub fn update(&mut self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.present);
        self.set(next);
    }

    /// Replace `present` now and schedule a history point. Clears the redo stack.
    pub fn set_with_history(&mut self, value: T) {
        self.present = value.clone();
        self.future.clear();
        self.pending = Some(value);
        self.debounce.arm(self.clock.now_ms());
    }

    pub fn update_with_history(&mut self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.present);
        self.set_with_history(next);
    }

    /// Run the debounced commit if its quiet period has elapsed. Returns whether an entry was
    /// recorded.
    pub fn poll(&mut self) -> bool {
        if !self.debounce.fire_if_due(self.clock.now_ms()) {
            return false;
        }
        self.commit_pending()
    }

    /// Commit the pending snapshot immediately.
    pub fn flush(&mut self) -> bool {
        self.debounce.cancel();
        self.commit_pending()
    }

    pub fn undo(&mut self) {
        self.cancel_pending();
        let Some(previous) = self.past.pop_back() else {
            return;
        };
        self.committed = previous.clone();
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
    }

    pub fn redo(&mut self) {
        self.cancel_pending();
        let Some(next) = self.future.pop_front() else {
            return;
        };
        self.committed = next.clone();
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        self.evict();
    }

    pub fn reset(&mut self, initial: T) {
        self.cancel_pending();
        self.past.clear();
        self.future.clear();
        self.committed = initial.clone();
        self.present = initial;
    }

    fn cancel_pending(&mut self) {
        self.debounce.cancel();
        self.pending = None;
    }

    fn commit_pending(&mut self) -> bool {
        let Some(snapshot) = self.pending.take() else {
            return false;
        };
        if same_state(&self.committed, &snapshot) {
            tracing::trace!("history commit skipped, state unchanged");
            return false;
        }
        let previous = std::mem::replace(&mut self.committed, snapshot);
        self.past.push_back(previous);
        self.evict();
        tracing::debug!(depth = self.past.len(), "history entry committed");
        true
    }

    fn evict(&mut self) {
        while self.past.len() > self.max_history {
            self.past.pop_front();
        }
    }
}

/// Structural equality via JSON. Anything that fails to serialize counts as changed.
fn same_state<T: Serialize>(a: &T, b: &T) -> bool {
    match (serde_json::to_value(a), serde_json::to_value(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

impl<T: std::fmt::Debug, C> std::fmt::Debug for History<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("History")
            .field("past", &self.past.len())
            .field("present", &self.present)
            .field("future", &self.future.len())
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::time::ManualTimeSource;

    #[derive(Clone, Debug, PartialEq, serde::Serialize)]
    struct Doc {
        count: u32,
        name: &'static str,
    }

    fn doc(count: u32) -> Doc {
        Doc {
            count,
            name: "test",
        }
    }

    fn history(debounce_ms: u64, max_history: usize) -> (History<Doc, ManualTimeSource>, ManualTimeSource) {
        let clock = ManualTimeSource::new(0.0);
        let h = History::new(
            doc(0),
            HistoryOptions {
                max_history,
                debounce_ms,
            },
            clock.clone(),
        );
        (h, clock)
    }

    #[test]
    fn set_does_not_record() {
        let (mut h, _) = history(100, 50);
        h.set(doc(1));
        h.update(|d| Doc {
            count: d.count + 1,
            ..d.clone()
        });
        assert_eq!(h.present().count, 2);
        assert!(!h.poll());
        assert!(!h.can_undo());
    }

    #[test]
    fn commit_waits_for_quiet_period() {
        let (mut h, clock) = history(100, 50);
        h.set_with_history(doc(1));
        assert_eq!(h.present(), &doc(1));
        assert!(!h.can_undo());
        clock.advance_ms(99.0);
        assert!(!h.poll());
        clock.advance_ms(1.0);
        assert!(h.poll());
        assert!(h.can_undo());
    }

    #[test]
    fn burst_coalesces_into_one_entry() {
        let (mut h, clock) = history(1000, 50);
        for i in 1..=5 {
            h.set_with_history(doc(i));
            clock.advance_ms(200.0);
            assert!(!h.poll());
        }
        clock.advance_ms(1000.0);
        assert!(h.poll());
        assert_eq!(h.past_len(), 1);

        h.undo();
        assert_eq!(h.present(), &doc(0));
        assert!(h.can_redo());
    }

    #[test]
    fn identical_state_is_not_recorded() {
        let (mut h, _) = history(0, 50);
        h.set_with_history(doc(0));
        assert!(!h.poll());
        assert!(!h.can_undo());
    }

    #[test]
    fn undo_redo_round_trip() {
        let (mut h, _) = history(0, 50);
        h.set_with_history(doc(1));
        assert!(h.poll());
        h.undo();
        assert_eq!(h.present(), &doc(0));
        assert!(!h.can_undo());
        assert!(h.can_redo());
        h.redo();
        assert_eq!(h.present(), &doc(1));
        assert!(h.can_undo());
        assert!(!h.can_redo());
    }

    #[test]
    fn new_edit_clears_redo() {
        let (mut h, _) = history(0, 50);
        h.set_with_history(doc(1));
        h.poll();
        h.set_with_history(doc(2));
        h.poll();
        h.undo();
        assert!(h.can_redo());
        h.set_with_history(doc(3));
        assert!(!h.can_redo());
    }

    #[test]
    fn oldest_entries_are_evicted() {
        let (mut h, _) = history(0, 3);
        for i in 1..=5 {
            h.set_with_history(doc(i));
            h.poll();
        }
        for _ in 0..5 {
            h.undo();
        }
        assert_eq!(h.present().count, 2);
    }

    #[test]
    fn undo_cancels_pending_commit() {
        let (mut h, clock) = history(100, 50);
        h.set_with_history(doc(1));
        h.poll();
        clock.advance_ms(100.0);
        assert!(h.poll());
        h.set_with_history(doc(2));
        h.undo();
        clock.advance_ms(500.0);
        assert!(!h.poll());
        assert_eq!(h.present(), &doc(0));
        assert!(!h.can_undo());
    }

    #[test]
    fn reset_clears_everything() {
        let (mut h, _) = history(0, 50);
        h.set_with_history(doc(1));
        h.poll();
        h.set_with_history(doc(2));
        h.reset(doc(100));
        assert_eq!(h.present(), &doc(100));
        assert!(!h.can_undo() && !h.can_redo());
        assert!(!h.has_pending_commit());
    }

    #[test]
    fn flush_commits_immediately() {
        let (mut h, _) = history(10_000, 50);
        h.update_with_history(|d| Doc {
            count: d.count + 1,
            ..d.clone()
        });
        assert!(h.flush());
        assert!(h.can_undo());
    }

    #[test]
    fn unserializable_states_count_as_changed() {
        #[derive(Clone)]
        struct Opaque;
        impl Serialize for Opaque {
            fn serialize<S: serde::Serializer>(&self, _s: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("nope"))
            }
        }
        let mut h = History::new(Opaque, HistoryOptions::default(), ManualTimeSource::new(0.0));
        h.set_with_history(Opaque);
        assert!(h.flush());
    }
}
