//! Per-session command history with up/down recall.
//!
//! Entries live in a fixed ring; once it is full the oldest line is
//! overwritten. Recall walks a cursor over the entries in chronological
//! order, where the position just past the newest entry is a blank line.

use tracing::trace;

/// Maximum number of lines kept per session.
pub const MAX_HISTORY_LINES: usize = 200;

#[derive(Clone, Debug)]
pub struct HistoryBuffer {
    entries: Vec<String>,
    /// Ring slot the next commit writes to.
    write_index: usize,
    /// Number of valid entries, saturating at capacity.
    used: usize,
    /// Cursor position recorded by the last commit.
    saved_index: usize,
    /// Recall position, `0..=used`; `used` is the blank line after the newest entry.
    cursor: usize,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY_LINES)
    }

    /// A history holding at most `capacity` lines (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: vec![String::new(); capacity.max(1)],
            write_index: 0,
            used: 0,
            saved_index: 0,
            cursor: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Store a finished line. Blank lines are not recorded.
    pub fn commit(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }

        self.entries[self.write_index] = line.to_string();
        self.write_index = (self.write_index + 1) % self.capacity();
        self.used = (self.used + 1).min(self.capacity());
        self.saved_index = self.used;
        self.cursor = self.saved_index;
        trace!(write_index = self.write_index, used = self.used, "history commit");
    }

    /// Step back to an older entry. Stepping past the oldest entry wraps to
    /// the blank line, so the next step starts again at the newest.
    pub fn recall_up(&mut self) -> &str {
        self.cursor = match self.cursor.checked_sub(1) {
            Some(pos) => pos,
            None => self.used,
        };
        self.current()
    }

    /// Step forward to a newer entry, stopping at the blank line.
    pub fn recall_down(&mut self) -> &str {
        self.cursor = (self.cursor + 1).min(self.used);
        self.current()
    }

    /// Put the cursor back where the last commit left it. Called when a line
    /// taken verbatim from history is submitted, so browsing restarts at the
    /// newest entry instead of where the previous browse stopped.
    pub fn reset_after_recall(&mut self) {
        if self.used > 0 {
            self.cursor = self.saved_index;
        }
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.used).filter_map(move |pos| self.get(pos))
    }

    fn current(&self) -> &str {
        self.get(self.cursor).unwrap_or("")
    }

    /// Entry at chronological position `pos` (0 is the oldest).
    fn get(&self, pos: usize) -> Option<&str> {
        if pos >= self.used {
            return None;
        }
        let oldest = if self.used == self.capacity() {
            self.write_index
        } else {
            0
        };
        let slot = (oldest + pos) % self.capacity();
        Some(self.entries[slot].as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_most_recent_is_one_up_away() {
        let mut h = HistoryBuffer::new();
        h.commit("first");
        h.commit("second");

        assert_eq!(h.recall_up(), "second");
        assert_eq!(h.recall_up(), "first");
    }

    #[test]
    fn test_blank_lines_not_committed() {
        let mut h = HistoryBuffer::new();
        h.commit("");
        h.commit("   ");
        assert!(h.is_empty());
    }

    #[test]
    fn test_up_past_oldest_wraps_to_blank() {
        let mut h = HistoryBuffer::new();
        h.commit("a");
        h.commit("b");

        assert_eq!(h.recall_up(), "b");
        assert_eq!(h.recall_up(), "a");
        assert_eq!(h.recall_up(), "");
        assert_eq!(h.recall_up(), "b");
    }

    #[test]
    fn test_recall_on_empty_history() {
        let mut h = HistoryBuffer::new();
        assert_eq!(h.recall_up(), "");
        assert_eq!(h.recall_up(), "");
        assert_eq!(h.recall_down(), "");
    }

    #[test]
    fn test_down_clamps_at_blank() {
        let mut h = HistoryBuffer::new();
        h.commit("a");
        h.commit("b");

        h.recall_up();
        h.recall_up();
        assert_eq!(h.recall_down(), "b");
        assert_eq!(h.recall_down(), "");
        assert_eq!(h.recall_down(), "");
        assert_eq!(h.recall_up(), "b");
    }

    #[test]
    fn test_reset_after_recall() {
        let mut h = HistoryBuffer::new();
        h.commit("a");
        h.commit("b");
        h.commit("c");

        h.recall_up();
        assert_eq!(h.recall_up(), "b");
        h.reset_after_recall();

        assert_eq!(h.recall_up(), "c");
    }

    #[test]
    fn test_recall_does_not_change_contents() {
        let mut h = HistoryBuffer::new();
        h.commit("a");
        h.commit("b");
        h.recall_up();
        h.recall_up();
        h.commit("c");

        assert_eq!(h.iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(h.recall_up(), "c");
    }

    #[test]
    fn test_ring_keeps_last_capacity_entries() {
        let capacity = MAX_HISTORY_LINES;
        let extra = 5;
        let mut h = HistoryBuffer::new();
        for i in 0..capacity + extra {
            h.commit(&format!("cmd{}", i));
        }

        assert_eq!(h.len(), capacity);
        let kept: Vec<&str> = h.iter().collect();
        assert_eq!(kept.first().copied(), Some("cmd5"));
        assert_eq!(kept.last().copied(), Some("cmd204"));
        assert!(!kept.contains(&"cmd4"));

        // Walking all the way up visits exactly the surviving entries.
        let mut seen = Vec::new();
        for _ in 0..capacity {
            seen.push(h.recall_up().to_string());
        }
        assert_eq!(seen.first().map(String::as_str), Some("cmd204"));
        assert_eq!(seen.last().map(String::as_str), Some("cmd5"));
        assert_eq!(h.recall_up(), "");
    }

    #[test]
    fn test_small_ring_wraps() {
        let mut h = HistoryBuffer::with_capacity(3);
        for cmd in ["a", "b", "c", "d"] {
            h.commit(cmd);
        }

        assert_eq!(h.iter().collect::<Vec<_>>(), vec!["b", "c", "d"]);
        assert_eq!(h.recall_up(), "d");
        assert_eq!(h.recall_up(), "c");
        assert_eq!(h.recall_up(), "b");
        assert_eq!(h.recall_up(), "");
    }
}
