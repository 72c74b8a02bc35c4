use std::collections::VecDeque;

use chrono::Duration;

use crate::api::Time;

pub const DEFAULT_CAPACITY: usize = 50;

/// Linear, bounded list of content snapshots with a cursor
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DraftHistory {
    entries: VecDeque<String>,
    cursor: usize,
    capacity: usize,
}

impl Default for DraftHistory {
    fn default() -> DraftHistory {
        DraftHistory::new(DEFAULT_CAPACITY)
    }
}

impl DraftHistory {
    pub fn new(capacity: usize) -> DraftHistory {
        DraftHistory {
            entries: VecDeque::new(),
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// Records `content` after the cursor, dropping whatever could have been
    /// redone. Returns whether an entry was added, which is not the case when
    /// `content` is the snapshot at the cursor.
    pub fn record(&mut self, content: &str) -> bool {
        if !self.entries.is_empty() {
            if self.entries[self.cursor] == content {
                return false;
            }
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(content.to_string());
        if self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
        true
    }

    pub fn undo(&mut self) -> Option<&str> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(&self.entries[self.cursor])
    }

    pub fn redo(&mut self) -> Option<&str> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(&self.entries[self.cursor])
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn current(&self) -> Option<&str> {
        self.entries.get(self.cursor).map(|s| s.as_str())
    }

    pub fn cursor(&self) -> Option<usize> {
        match self.entries.is_empty() {
            true => None,
            false => Some(self.cursor),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|s| s.as_str())
    }
}

/// `DraftHistory` fed by keystrokes: content is only recorded once typing
/// paused for the debounce delay
#[derive(Clone, Debug)]
pub struct TypingHistory {
    history: DraftHistory,
    debounce: Duration,
    pending: Option<(String, Time)>,
}

impl TypingHistory {
    pub fn new(capacity: usize, debounce: Duration) -> TypingHistory {
        TypingHistory {
            history: DraftHistory::new(capacity),
            debounce,
            pending: None,
        }
    }

    pub fn history(&self) -> &DraftHistory {
        &self.history
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Content changed because of typing. Replaces any earlier pending content
    /// and restarts the delay.
    pub fn input(&mut self, content: &str, now: Time) {
        self.pending = Some((content.to_string(), now + self.debounce));
    }

    /// Records the pending content if typing paused long enough
    pub fn tick(&mut self, now: Time) -> bool {
        match &self.pending {
            Some((_, due)) if *due <= now => self.flush(),
            _ => false,
        }
    }

    pub fn flush(&mut self) -> bool {
        match self.pending.take() {
            Some((content, _)) => self.history.record(&content),
            None => false,
        }
    }

    /// Records an edit immediately, bypassing the delay.
    ///
    /// `before` is the content prior to the edit, recorded first if it had not
    /// been yet, so that the edit is undone in a single step.
    pub fn commit(&mut self, before: &str, after: &str) {
        self.pending = None;
        self.history.record(before);
        self.history.record(after);
    }

    /// Returns the content to put back in the editor, if there is anything to
    /// undo. Pending typing is recorded first so it can be redone.
    pub fn undo(&mut self) -> Option<String> {
        self.flush();
        self.history.undo().map(String::from)
    }

    pub fn redo(&mut self) -> Option<String> {
        self.flush();
        self.history.redo().map(String::from)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(ms: i64) -> Time {
        chrono::Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn identical_content_is_recorded_once() {
        let mut h = DraftHistory::default();
        assert!(h.record("a"));
        assert!(!h.record("a"));
        assert_eq!(h.len(), 1);
        assert_eq!(h.cursor(), Some(0));
    }

    #[test]
    fn oldest_snapshot_is_evicted() {
        let mut h = DraftHistory::default();
        for i in 0..51 {
            h.record(&i.to_string());
        }
        assert_eq!(h.len(), 50);
        assert_eq!(h.entries().next(), Some("1"));
        assert_eq!(h.current(), Some("50"));
        assert_eq!(h.cursor(), Some(49));
    }

    #[test]
    fn undo_then_redo_restores() {
        let mut h = DraftHistory::default();
        for s in ["a", "ab", "abc", "abcd"] {
            h.record(s);
        }
        for _ in 0..3 {
            assert!(h.undo().is_some());
        }
        assert_eq!(h.current(), Some("a"));
        assert_eq!(h.undo(), None);
        for _ in 0..3 {
            assert!(h.redo().is_some());
        }
        assert_eq!(h.current(), Some("abcd"));
        assert_eq!(h.redo(), None);
    }

    #[test]
    fn recording_after_undo_drops_redo_branch() {
        let mut h = DraftHistory::default();
        for s in ["a", "ab", "abc"] {
            h.record(s);
        }
        h.undo();
        h.undo();
        assert!(h.record("ax"));
        assert!(!h.can_redo());
        assert_eq!(h.entries().collect::<Vec<_>>(), vec!["a", "ax"]);
    }

    #[test]
    fn typing_is_debounced() {
        let mut t = TypingHistory::new(DEFAULT_CAPACITY, Duration::milliseconds(1000));
        t.input("a", at(0));
        assert!(!t.tick(at(999)));
        assert!(t.tick(at(1000)));
        t.input("a", at(1100));
        t.input("ab", at(1500));
        assert!(!t.tick(at(2100)));
        assert!(t.tick(at(2500)));
        assert_eq!(t.history().entries().collect::<Vec<_>>(), vec!["a", "ab"]);
        assert_eq!(t.history().cursor(), Some(1));
        assert_eq!(t.undo().as_deref(), Some("a"));
        assert_eq!(t.history().cursor(), Some(0));
    }

    #[test]
    fn undo_records_pending_typing_first() {
        let mut t = TypingHistory::new(DEFAULT_CAPACITY, Duration::milliseconds(1000));
        t.commit("", "a");
        t.input("abc", at(0));
        assert_eq!(t.undo().as_deref(), Some("a"));
        assert_eq!(t.redo().as_deref(), Some("abc"));
    }

    #[test]
    fn discrete_edits_are_one_step() {
        let mut t = TypingHistory::new(DEFAULT_CAPACITY, Duration::milliseconds(1000));
        t.commit("", "hello");
        t.input("hello world", at(0));
        t.commit("hello world", "hello **world**");
        assert!(!t.has_pending());
        assert_eq!(t.undo().as_deref(), Some("hello world"));
        assert_eq!(t.undo().as_deref(), Some("hello"));
    }

    #[derive(Clone, Debug)]
    enum Op {
        Record(u8),
        Undo,
        Redo,
    }

    impl Op {
        fn from_raw((kind, value): (u8, u8)) -> Op {
            match kind % 3 {
                0 => Op::Record(value),
                1 => Op::Undo,
                _ => Op::Redo,
            }
        }
    }

    #[test]
    fn matches_unbounded_model() {
        bolero::check!()
            .with_type::<(u8, Vec<(u8, u8)>)>()
            .cloned()
            .for_each(|(capacity, ops)| {
                let ops = ops.into_iter().map(Op::from_raw);
                let capacity = usize::from(capacity % 8) + 1;
                let mut h = DraftHistory::new(capacity);
                let mut model: Vec<String> = Vec::new();
                let mut cursor = 0;
                for op in ops {
                    match op {
                        Op::Record(c) => {
                            let c = (c % 4).to_string();
                            if model.get(cursor) != Some(&c) || model.is_empty() {
                                model.truncate(cursor + 1);
                                model.push(c.clone());
                                if model.len() > capacity {
                                    model.remove(0);
                                }
                                cursor = model.len() - 1;
                            }
                            h.record(&c);
                        }
                        Op::Undo => {
                            let expected = match cursor > 0 {
                                true => {
                                    cursor -= 1;
                                    Some(model[cursor].as_str())
                                }
                                false => None,
                            };
                            assert_eq!(h.undo(), expected);
                        }
                        Op::Redo => {
                            let expected = match cursor + 1 < model.len() {
                                true => {
                                    cursor += 1;
                                    Some(model[cursor].as_str())
                                }
                                false => None,
                            };
                            assert_eq!(h.redo(), expected);
                        }
                    }
                    assert!(h.len() <= capacity);
                    assert_eq!(h.entries().collect::<Vec<_>>(), model);
                }
            })
    }
}
