/// Caret arithmetic for undo and redo.
use crate::history::EditRecord;

/// Caret offset after reverting `chain` (most recent first), starting from
/// `start`.
///
/// A record that ends before the caret shifts it by its length delta. A
/// record that covers the caret pulls it back to where the record began.
pub fn undo_caret(chain: &[EditRecord], start: usize) -> usize {
    chain.iter().fold(start, |acc, record| {
        let applied = record.applied_range();
        if applied.start >= acc {
            acc
        } else if applied.end < acc {
            acc - record.to_len() + record.from_len()
        } else {
            applied.start
        }
    })
}

/// Caret offset after reapplying `chain` (chronological), starting from
/// `start`.
pub fn redo_caret(chain: &[EditRecord], start: usize) -> usize {
    chain.iter().fold(start, |acc, record| {
        let caret = record.caret;
        if caret.start > acc {
            acc
        } else if caret.end < acc {
            acc - record.from_len() + record.to_len()
        } else {
            caret.start + record.to_len()
        }
    })
}
