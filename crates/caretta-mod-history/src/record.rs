/// Core types for history records.
use serde::{Deserialize, Serialize};

/// A caret or selection range in the logical value.
///
/// Offsets are char counts into the value, `start <= end`. A collapsed
/// caret (`start == end`) is a plain cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Caret {
    /// Offset of the first char in the range.
    pub start: usize,
    /// Offset one past the last char in the range.
    pub end: usize,
}

impl Caret {
    /// Creates a range, swapping the bounds if they are reversed.
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Creates a collapsed caret at `pos`.
    pub fn collapsed(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Returns true if the range selects nothing.
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Number of chars covered by the range.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the range is empty. Same as [`Caret::is_collapsed`].
    pub fn is_empty(&self) -> bool {
        self.is_collapsed()
    }

    /// Clamps both bounds to `len`.
    pub fn clamp(self, len: usize) -> Self {
        Self {
            start: self.start.min(len),
            end: self.end.min(len),
        }
    }
}

/// A record before it is pushed: the store fills in `from`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialRecord {
    /// Replacement text.
    pub to: String,
    /// Range being replaced, in the pre-edit value.
    pub caret: Caret,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// A single edit in the history log.
///
/// Replacing `caret` in the value before the record with `to` yields the
/// value after it. `from` is the text that was replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRecord {
    /// Text removed from the pre-edit value.
    pub from: String,
    /// Text inserted in its place (empty for deletions).
    pub to: String,
    /// Replaced range, in the pre-edit value's coordinates.
    pub caret: Caret,
    /// Milliseconds since the Unix epoch at creation.
    pub timestamp: i64,
    /// Whether the record is currently applied.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl EditRecord {
    /// Char length of `from`.
    pub fn from_len(&self) -> usize {
        self.from.chars().count()
    }

    /// Char length of `to`.
    pub fn to_len(&self) -> usize {
        self.to.chars().count()
    }

    /// Range covered by `to` once the record is applied.
    pub fn applied_range(&self) -> Caret {
        Caret {
            start: self.caret.start,
            end: self.caret.start + self.to_len(),
        }
    }

    /// Returns true if the record removes text without inserting any.
    pub fn is_deletion(&self) -> bool {
        self.to.is_empty() && !self.from.is_empty()
    }

    /// The text this record is "about": what it inserted, or for pure
    /// deletions, what it removed.
    pub fn edited_text(&self) -> &str {
        if self.to.is_empty() {
            &self.from
        } else {
            &self.to
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> EditRecord {
        EditRecord {
            from: "cool".to_string(),
            to: "brand new".to_string(),
            caret: Caret::new(6, 10),
            timestamp: 1_700_000_000_000,
            active: true,
        }
    }

    #[test]
    fn test_caret_new_orders_bounds() {
        assert_eq!(Caret::new(5, 2), Caret { start: 2, end: 5 });
        assert_eq!(Caret::new(2, 5), Caret { start: 2, end: 5 });
    }

    #[test]
    fn test_caret_collapsed() {
        let caret = Caret::collapsed(3);
        assert!(caret.is_collapsed());
        assert_eq!(caret.len(), 0);
        assert!(!Caret::new(1, 3).is_collapsed());
        assert_eq!(Caret::new(1, 3).len(), 2);
    }

    #[test]
    fn test_caret_clamp() {
        assert_eq!(Caret::new(4, 9).clamp(6), Caret::new(4, 6));
        assert_eq!(Caret::new(8, 9).clamp(6), Caret::collapsed(6));
    }

    #[test]
    fn test_applied_range_uses_char_counts() {
        let record = EditRecord {
            from: String::new(),
            to: "héé".to_string(),
            caret: Caret::collapsed(2),
            timestamp: 0,
            active: true,
        };
        assert_eq!(record.applied_range(), Caret::new(2, 5));
        assert_eq!(record.to_len(), 3);
    }

    #[test]
    fn test_edited_text_for_deletion() {
        let record = EditRecord {
            from: " ".to_string(),
            to: String::new(),
            caret: Caret::new(5, 6),
            timestamp: 0,
            active: true,
        };
        assert!(record.is_deletion());
        assert_eq!(record.edited_text(), " ");
        assert_eq!(sample_record().edited_text(), "brand new");
    }

    #[test]
    fn test_edit_record_bincode_roundtrip() {
        let record = sample_record();
        let bytes = bincode::serialize(&record).expect("serialize");
        let decoded: EditRecord = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_missing_active_flag_defaults_to_true() {
        let json = r#"{"from":"","to":"a","caret":{"start":0,"end":0},"timestamp":5}"#;
        let record: EditRecord = serde_json::from_str(json).expect("deserialize");
        assert!(record.active);
        assert_eq!(record.to, "a");
    }
}
