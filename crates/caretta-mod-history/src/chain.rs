/// Adjacency rules deciding which records undo/redo together.
///
/// The store only needs a predicate `Fn(earlier, later) -> bool`; everything
/// here is a pure function of two records so grouping policies can be
/// swapped without touching [`crate::HistoryStore`].
use crate::config::DEFAULT_COALESCE_WINDOW_MS;
use crate::record::EditRecord;

/// Returns true if the two records were created less than `window_ms` apart.
pub fn within_window(a: &EditRecord, b: &EditRecord, window_ms: u64) -> bool {
    a.timestamp.abs_diff(b.timestamp) < window_ms
}

/// Whitespace-only edits never share a chain with word edits.
///
/// A record is blank when the text it is about is non-empty and made only
/// of whitespace. Two records may chain only if both are blank or both are
/// not, so `"hello world"` undoes as `world`, ` `, then `hello`.
pub fn split_on_blank_space(a: &EditRecord, b: &EditRecord) -> bool {
    is_blank(a) == is_blank(b)
}

/// The later record must start, or end, where the earlier one left off.
///
/// Forward typing starts at the end of the previous insertion; backspacing
/// ends where the previous deletion started.
pub fn keep_continuity(a: &EditRecord, b: &EditRecord) -> bool {
    let a_end = a.applied_range().end;
    b.caret.start == a_end || b.caret.end == a_end
}

fn is_blank(record: &EditRecord) -> bool {
    let text = record.edited_text();
    !text.is_empty() && text.chars().all(char::is_whitespace)
}

/// Grouping policy used by the editor for undo/redo steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainPolicy {
    /// Max gap between two chained records, in milliseconds. Zero disables
    /// chaining entirely.
    pub coalesce_window_ms: u64,
    /// Apply [`split_on_blank_space`].
    pub split_on_blank: bool,
    /// Apply [`keep_continuity`].
    pub require_continuity: bool,
}

impl Default for ChainPolicy {
    fn default() -> Self {
        Self::word(DEFAULT_COALESCE_WINDOW_MS)
    }
}

impl ChainPolicy {
    /// Word-level grouping: rapid contiguous edits chain until whitespace.
    pub fn word(coalesce_window_ms: u64) -> Self {
        Self {
            coalesce_window_ms,
            split_on_blank: true,
            require_continuity: true,
        }
    }

    /// Every record is its own undo step.
    pub fn keystroke() -> Self {
        Self {
            coalesce_window_ms: 0,
            split_on_blank: true,
            require_continuity: true,
        }
    }

    /// Returns true if `later` belongs in the same undo step as `earlier`.
    pub fn is_adjacent(&self, earlier: &EditRecord, later: &EditRecord) -> bool {
        within_window(earlier, later, self.coalesce_window_ms)
            && (!self.split_on_blank || split_on_blank_space(earlier, later))
            && (!self.require_continuity || keep_continuity(earlier, later))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Caret;

    fn insert(at: usize, text: &str, timestamp: i64) -> EditRecord {
        EditRecord {
            from: String::new(),
            to: text.to_string(),
            caret: Caret::collapsed(at),
            timestamp,
            active: true,
        }
    }

    fn delete(start: usize, removed: &str, timestamp: i64) -> EditRecord {
        EditRecord {
            from: removed.to_string(),
            to: String::new(),
            caret: Caret::new(start, start + removed.chars().count()),
            timestamp,
            active: true,
        }
    }

    #[test]
    fn test_within_window_is_strict() {
        let a = insert(0, "a", 1000);
        assert!(within_window(&a, &insert(1, "b", 1599), 600));
        assert!(!within_window(&a, &insert(1, "b", 1600), 600));
        // Order does not matter
        assert!(within_window(&insert(1, "b", 1599), &a, 600));
    }

    #[test]
    fn test_blank_space_splits_words() {
        let word = insert(4, "o", 0);
        let space = insert(5, " ", 0);
        assert!(!split_on_blank_space(&word, &space));
        assert!(!split_on_blank_space(&space, &insert(6, "w", 0)));
        assert!(split_on_blank_space(&space, &insert(6, "  ", 0)));
        assert!(split_on_blank_space(&word, &insert(5, "x", 0)));
    }

    #[test]
    fn test_blank_deletion_counts_as_blank() {
        let removed_space = delete(5, " ", 0);
        let removed_letter = delete(4, "o", 0);
        assert!(!split_on_blank_space(&removed_letter, &removed_space));
    }

    #[test]
    fn test_text_with_inner_space_is_not_blank() {
        let paste = insert(6, "brand new", 0);
        assert!(split_on_blank_space(&insert(5, "x", 0), &paste));
    }

    #[test]
    fn test_continuity_forward_typing() {
        assert!(keep_continuity(&insert(0, "h", 0), &insert(1, "e", 0)));
        assert!(keep_continuity(&insert(0, "he", 0), &insert(2, "l", 0)));
        assert!(!keep_continuity(&insert(10, "d", 0), &insert(6, "c", 0)));
    }

    #[test]
    fn test_continuity_backspacing() {
        assert!(keep_continuity(&delete(9, "w", 0), &delete(8, "e", 0)));
        assert!(!keep_continuity(&delete(9, "w", 0), &delete(3, "l", 0)));
    }

    #[test]
    fn test_word_policy_combines_rules() {
        let policy = ChainPolicy::word(600);
        assert!(policy.is_adjacent(&insert(0, "h", 0), &insert(1, "e", 100)));
        assert!(!policy.is_adjacent(&insert(0, "h", 0), &insert(1, "e", 700)));
        assert!(!policy.is_adjacent(&insert(0, "h", 0), &insert(1, " ", 100)));
        assert!(!policy.is_adjacent(&insert(0, "h", 0), &insert(7, "e", 100)));
    }

    #[test]
    fn test_keystroke_policy_never_chains() {
        let policy = ChainPolicy::keystroke();
        assert!(!policy.is_adjacent(&insert(0, "h", 0), &insert(1, "e", 0)));
    }

    #[test]
    fn test_default_policy_uses_default_window() {
        assert_eq!(ChainPolicy::default().coalesce_window_ms, 600);
    }
}
