/// Errors raised by the history store.
use thiserror::Error;

/// Failures of [`crate::HistoryStore`] operations.
///
/// Both variants mean the caller and the log disagree about the current
/// value. They abort the single operation; the store is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// A caret does not fit inside the current value.
    #[error("range {start}..{end} is out of bounds (value has {len} chars)")]
    InvalidRange {
        start: usize,
        end: usize,
        len: usize,
    },

    /// A restored record's `from` text does not match the folded value.
    #[error("record {index} expected {expected:?} but the value holds {found:?}")]
    RecordMismatch {
        index: usize,
        expected: String,
        found: String,
    },
}
