/// Record log with an applied/reverted cursor.
///
/// The log is the source of truth for the value: folding every active
/// record over the seed reproduces it. Undo and redo move the cursor over
/// the same sequence instead of shuffling records between two stacks.
use ropey::Rope;

use crate::config::DEFAULT_MAX_RECORDS;
use crate::error::HistoryError;
use crate::record::{Caret, EditRecord, PartialRecord};

/// History of one editing session.
///
/// `records[..cursor]` are active (applied), `records[cursor..]` are
/// inactive and kept for redo.
pub struct HistoryStore {
    /// Value before the first record in the log.
    seed: String,
    /// All records, oldest first.
    records: Vec<EditRecord>,
    /// Number of active records.
    cursor: usize,
    /// Fold of `seed` and the active records.
    value: Rope,
    /// Cap on `records.len()`.
    max_records: usize,
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("records_len", &self.records.len())
            .field("cursor", &self.cursor)
            .field("value_chars", &self.value.len_chars())
            .field("max_records", &self.max_records)
            .finish()
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new("")
    }
}

/// Replaces `[start, end)` of `rope` with `text`.
fn splice(rope: &mut Rope, start: usize, end: usize, text: &str) {
    if start < end {
        rope.remove(start..end);
    }
    if !text.is_empty() {
        rope.insert(start, text);
    }
}

/// Applies `record` to `rope`, checking that it fits the current text.
fn apply_checked(rope: &mut Rope, record: &EditRecord, index: usize) -> Result<(), HistoryError> {
    let Caret { start, end } = record.caret;
    let len = rope.len_chars();
    if start > end || end > len {
        return Err(HistoryError::InvalidRange { start, end, len });
    }
    let found = rope.slice(start..end).to_string();
    if found != record.from {
        return Err(HistoryError::RecordMismatch {
            index,
            expected: record.from.clone(),
            found,
        });
    }
    splice(rope, start, end, &record.to);
    Ok(())
}

impl HistoryStore {
    /// Creates an empty log over `seed`.
    pub fn new(seed: impl Into<String>) -> Self {
        let seed = seed.into();
        let value = Rope::from_str(&seed);
        Self {
            seed,
            records: Vec::new(),
            cursor: 0,
            value,
            max_records: DEFAULT_MAX_RECORDS,
        }
    }

    /// Restores a log from previously persisted records.
    ///
    /// Every record is replayed over `seed`, so a log that does not
    /// describe `seed` is rejected rather than producing a corrupt value.
    /// Active records found after the first inactive one are demoted, since
    /// the active set must be a prefix of the log.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRange` or `RecordMismatch` for the first record that
    /// does not fold.
    pub fn with_records(
        seed: impl Into<String>,
        mut records: Vec<EditRecord>,
    ) -> Result<Self, HistoryError> {
        let seed = seed.into();
        let mut value = Rope::from_str(&seed);
        let mut cursor = None;

        for (index, record) in records.iter_mut().enumerate() {
            match cursor {
                None if record.active => apply_checked(&mut value, record, index)?,
                None => cursor = Some(index),
                Some(_) if record.active => {
                    tracing::warn!("Demoting active record {index} found after the redo boundary");
                    record.active = false;
                }
                Some(_) => {}
            }
        }
        let cursor = cursor.unwrap_or(records.len());

        // Redo must never hit a record that does not fit.
        let mut scratch = value.clone();
        for (index, record) in records.iter().enumerate().skip(cursor) {
            apply_checked(&mut scratch, record, index)?;
        }

        tracing::debug!(
            records = records.len(),
            active = cursor,
            "Restored history log"
        );

        Ok(Self {
            seed,
            records,
            cursor,
            value,
            max_records: DEFAULT_MAX_RECORDS,
        })
    }

    /// Sets the cap on the number of records kept, trimming a restored log
    /// that is already over it.
    pub fn with_max_records(mut self, max_records: usize) -> Self {
        self.max_records = max_records.max(1);
        self.enforce_capacity();
        self
    }

    /// Appends a new record built from `partial` and applies it.
    ///
    /// `from` is read from the current value. Inactive records are dropped:
    /// a new edit invalidates the redo history.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRange` if the caret does not fit the current value.
    pub fn push(&mut self, partial: PartialRecord) -> Result<EditRecord, HistoryError> {
        let Caret { start, end } = partial.caret;
        let len = self.value.len_chars();
        if start > end || end > len {
            return Err(HistoryError::InvalidRange { start, end, len });
        }

        let record = EditRecord {
            from: self.value.slice(start..end).to_string(),
            to: partial.to,
            caret: partial.caret,
            timestamp: partial.timestamp,
            active: true,
        };

        let dropped = self.records.len() - self.cursor;
        if dropped > 0 {
            tracing::trace!(dropped, "Discarding redo tail");
            self.records.truncate(self.cursor);
        }

        splice(&mut self.value, start, end, &record.to);
        self.records.push(record.clone());
        self.cursor += 1;
        self.enforce_capacity();

        Ok(record)
    }

    /// Deactivates the latest active record and every earlier record
    /// chained to it.
    ///
    /// `is_adjacent(earlier, later)` decides whether the walk continues.
    /// Returns the reverted records, most recent first.
    pub fn revert_chain<F>(&mut self, mut is_adjacent: F) -> Vec<EditRecord>
    where
        F: FnMut(&EditRecord, &EditRecord) -> bool,
    {
        let mut reverted = Vec::new();
        while self.cursor > 0 {
            self.cursor -= 1;
            let record = &mut self.records[self.cursor];
            record.active = false;
            let applied = record.applied_range();
            splice(&mut self.value, applied.start, applied.end, &record.from);
            reverted.push(record.clone());

            if self.cursor == 0
                || !is_adjacent(&self.records[self.cursor - 1], &self.records[self.cursor])
            {
                break;
            }
        }
        reverted
    }

    /// Reactivates the first inactive record and every following record
    /// chained to it.
    ///
    /// Returns the reapplied records in chronological order.
    pub fn apply_chain<F>(&mut self, mut is_adjacent: F) -> Vec<EditRecord>
    where
        F: FnMut(&EditRecord, &EditRecord) -> bool,
    {
        let mut applied = Vec::new();
        while self.cursor < self.records.len() {
            let record = &mut self.records[self.cursor];
            record.active = true;
            splice(
                &mut self.value,
                record.caret.start,
                record.caret.end,
                &record.to,
            );
            applied.push(record.clone());
            self.cursor += 1;

            if self.cursor == self.records.len()
                || !is_adjacent(&self.records[self.cursor - 1], &self.records[self.cursor])
            {
                break;
            }
        }
        applied
    }

    /// Returns the current value.
    pub fn value(&self) -> String {
        self.value.to_string()
    }

    /// Number of chars in the current value.
    pub fn len_chars(&self) -> usize {
        self.value.len_chars()
    }

    /// Re-derives the value by folding the active records over the seed.
    pub fn fold_value(&self) -> String {
        let mut rope = Rope::from_str(&self.seed);
        for record in &self.records[..self.cursor] {
            splice(&mut rope, record.caret.start, record.caret.end, &record.to);
        }
        rope.to_string()
    }

    /// The full log, active and inactive records, oldest first.
    pub fn records(&self) -> &[EditRecord] {
        &self.records
    }

    /// Value the log starts from.
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Number of applied records.
    pub fn active_count(&self) -> usize {
        self.cursor
    }

    /// Whether undo has anything to revert.
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether redo has anything to reapply.
    pub fn can_redo(&self) -> bool {
        self.cursor < self.records.len()
    }

    /// Forgets every record. The current value becomes the new seed.
    pub fn clear(&mut self) {
        self.seed = self.value.to_string();
        self.records.clear();
        self.cursor = 0;
    }

    /// Folds the oldest applied records into the seed once the log is over
    /// capacity. If that is not enough, the newest reverted records go.
    fn enforce_capacity(&mut self) {
        if self.records.len() <= self.max_records {
            return;
        }
        let excess = self.records.len() - self.max_records;
        let folded = excess.min(self.cursor);
        if folded > 0 {
            let mut seed = Rope::from_str(&self.seed);
            for record in self.records.drain(..folded) {
                splice(&mut seed, record.caret.start, record.caret.end, &record.to);
            }
            self.seed = seed.to_string();
            self.cursor -= folded;
            tracing::debug!(folded, "Folded oldest records into the seed");
        }
        if self.records.len() > self.max_records {
            let dropped = self.records.len() - self.max_records;
            self.records.truncate(self.max_records);
            tracing::debug!(dropped, "Dropped redo records over capacity");
        }
    }
}
