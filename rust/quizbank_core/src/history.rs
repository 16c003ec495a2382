//! Bounded linear undo/redo over whole snapshots of the question list.

/// Maximum number of retained snapshots.
pub const MAX_HISTORY: usize = 50;

/// Versioned-state container. Content-agnostic: it never inspects the
/// snapshots it holds, so callers must pass a structurally new value to
/// every [`History::commit`] rather than mutating the current one in place.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: Vec<T>,
    cursor: usize,
}

impl<T> History<T> {
    pub fn new(seed: T) -> Self {
        Self { entries: vec![seed], cursor: 0 }
    }

    /// The currently active snapshot.
    pub fn current(&self) -> &T {
        &self.entries[self.cursor]
    }

    /// Record a new snapshot, discarding any redoable future.
    ///
    /// At capacity the oldest entry is evicted from the front and the cursor
    /// stays pinned at the last index instead of advancing, so the oldest
    /// states become unreachable by undo. Either way `current()` is the
    /// committed snapshot afterwards.
    pub fn commit(&mut self, snapshot: T) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);
        if self.entries.len() > MAX_HISTORY {
            self.entries.remove(0);
        } else {
            self.cursor += 1;
        }
    }

    /// Step back one snapshot; no-op at the oldest retained state.
    pub fn undo(&mut self) -> &T {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
        self.current()
    }

    /// Step forward one snapshot; no-op at the newest state.
    pub fn redo(&mut self) -> &T {
        if self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
        }
        self.current()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn undo_then_redo_are_inverse() {
        let a: Arc<Vec<u32>> = Arc::new(vec![1]);
        let b: Arc<Vec<u32>> = Arc::new(vec![1, 2]);
        let mut history = History::new(Arc::clone(&a));
        history.commit(Arc::clone(&b));

        assert!(Arc::ptr_eq(history.undo(), &a));
        assert!(Arc::ptr_eq(history.redo(), &b));
    }

    #[test]
    fn boundary_undo_redo_are_no_ops() {
        let mut history = History::new(0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(*history.undo(), 0);
        assert_eq!(*history.redo(), 0);
    }

    #[test]
    fn commit_truncates_redoable_future() {
        let mut history = History::new(0);
        history.commit(1);
        history.commit(2);
        history.undo();
        history.commit(3);
        assert!(!history.can_redo());
        assert_eq!(*history.current(), 3);
        // 2 is unreachable: walking back only finds 1 then 0
        assert_eq!(*history.undo(), 1);
        assert_eq!(*history.undo(), 0);
    }

    #[test]
    fn length_never_exceeds_capacity() {
        let mut history = History::new(0usize);
        for i in 1..=200 {
            history.commit(i);
            assert!(history.len() <= MAX_HISTORY);
        }
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(*history.current(), 200);
    }

    #[test]
    fn eviction_pins_cursor_and_keeps_latest_current() {
        let mut history = History::new(0usize);
        for i in 1..MAX_HISTORY {
            history.commit(i);
        }
        assert_eq!(history.len(), MAX_HISTORY);

        // Next commit evicts the seed instead of advancing the cursor.
        history.commit(MAX_HISTORY);
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(*history.current(), MAX_HISTORY);
        assert!(history.can_undo());
        assert!(!history.can_redo());

        // The oldest reachable state is now 1, not the original seed.
        let mut oldest = *history.current();
        while history.can_undo() {
            oldest = *history.undo();
        }
        assert_eq!(oldest, 1);
    }
}
