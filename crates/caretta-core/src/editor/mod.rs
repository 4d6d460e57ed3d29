//! The edit controller: write, undo and redo over a rendering surface.
//!
//! Every change goes through the history log. The editor keeps no value of
//! its own; it reads the log's value, renders it, and parks the caret the
//! edit wants in a [`CaretTracker`] until the host reports that rendering
//! is done ([`Editor::after_render`]).
mod fold;
mod input;
mod session;

pub use fold::{redo_caret, undo_caret};

use std::fmt;
use std::sync::Arc;

use caretta_config::FieldConfig;
use serde::Serialize;

use crate::caret::CaretTracker;
use crate::clock::{Clock, SystemClock};
use crate::content::Content;
use crate::error::EditError;
use crate::filter::{self, CustomFilter, FilterOptions};
use crate::history::{Caret, ChainPolicy, EditRecord, HistoryStore, PartialRecord};
use crate::surface::RenderSurface;

type Observer = Box<dyn FnMut(&EditRecord, &str)>;

/// Construction-time options of an [`Editor`].
#[derive(Clone, Default)]
pub struct EditorOptions {
    pub config: FieldConfig,
    /// Previously saved log, replayed over `config.initial_value`.
    pub initial_records: Vec<EditRecord>,
    pub custom_filter: Option<CustomFilter>,
    /// Chain policy. Defaults to word-level grouping over the configured
    /// coalescing window.
    pub policy: Option<ChainPolicy>,
}

impl fmt::Debug for EditorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorOptions")
            .field("config", &self.config)
            .field("initial_records", &self.initial_records.len())
            .field("custom_filter", &self.custom_filter.is_some())
            .field("policy", &self.policy)
            .finish()
    }
}

impl EditorOptions {
    /// Options for `config` with no restored log and no custom filter.
    pub fn new(config: FieldConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Replays `records` over the initial value at construction.
    pub fn with_initial_records(mut self, records: Vec<EditRecord>) -> Self {
        self.initial_records = records;
        self
    }

    /// Installs a transform that runs after the character sets.
    pub fn with_custom_filter<F>(mut self, custom: F) -> Self
    where
        F: Fn(&str, &str) -> String + Send + Sync + 'static,
    {
        self.custom_filter = Some(Arc::new(custom));
        self
    }

    /// Overrides the chain policy used by undo and redo.
    pub fn with_policy(mut self, policy: ChainPolicy) -> Self {
        self.policy = Some(policy);
        self
    }
}

/// Result of a write, undo or redo.
///
/// The surface has already been re-rendered when this is returned. The caret
/// is pending until [`Editor::after_render`] runs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Commit {
    /// Records created, reverted or reapplied. Empty for a no-op.
    pub records: Vec<EditRecord>,
    /// Value after the operation.
    pub value: String,
    /// Caret left pending, if any.
    pub caret: Option<Caret>,
}

impl Commit {
    /// True when nothing was created, reverted or reapplied.
    pub fn is_noop(&self) -> bool {
        self.records.is_empty()
    }
}

/// Selection as seen by the editor and by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectionRange {
    /// Logical offsets into the value.
    pub absolute: Caret,
    /// Rendered offsets, decorations included.
    pub visual: Caret,
}

/// An editable field bound to a rendering surface.
pub struct Editor<S: RenderSurface> {
    history: HistoryStore,
    caret: CaretTracker,
    filter: FilterOptions,
    policy: ChainPolicy,
    ignore: Vec<String>,
    clock: Box<dyn Clock>,
    observer: Option<Observer>,
    surface: S,
}

impl<S: RenderSurface + fmt::Debug> fmt::Debug for Editor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("history", &self.history)
            .field("caret", &self.caret)
            .field("filter", &self.filter)
            .field("policy", &self.policy)
            .field("ignore", &self.ignore)
            .field("surface", &self.surface)
            .finish_non_exhaustive()
    }
}

impl<S: RenderSurface> Editor<S> {
    /// Creates an editor, renders the initial value and puts the caret at
    /// its end.
    ///
    /// # Errors
    ///
    /// Returns `EditError::History` if `initial_records` do not fold over
    /// the initial value.
    pub fn new(mut surface: S, options: EditorOptions) -> Result<Self, EditError> {
        let EditorOptions {
            mut config,
            initial_records,
            custom_filter,
            policy,
        } = options;
        // A restored log was recorded over the stored value as is.
        if initial_records.is_empty() {
            config.sanitize();
        }

        let history = HistoryStore::with_records(config.initial_value.clone(), initial_records)?
            .with_max_records(config.max_records);

        let mut filter = FilterOptions::from_config(&config);
        if let Some(custom) = custom_filter {
            filter = filter.with_custom(custom);
        }

        let value = history.value();
        let end = history.len_chars();
        surface.render(&value);
        surface.set_absolute_range(end, end, &config.ignore);

        tracing::debug!(
            records = history.records().len(),
            active = history.active_count(),
            "Editor ready"
        );

        Ok(Self {
            history,
            caret: CaretTracker::new(),
            filter,
            policy: policy.unwrap_or_else(|| ChainPolicy::word(config.coalesce_window_ms)),
            ignore: config.ignore,
            clock: Box::new(SystemClock),
            observer: None,
            surface,
        })
    }

    /// Replaces the timestamp source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Called with each created, reverted or reapplied record and the value
    /// after the operation.
    pub fn set_observer<F>(&mut self, observer: F)
    where
        F: FnMut(&EditRecord, &str) + 'static,
    {
        self.observer = Some(Box::new(observer));
    }

    /// Replaces `explicit` (or the current caret) with `content`.
    ///
    /// Without an explicit caret, the pending or live caret is used when the
    /// surface has focus, and the end of the value otherwise. A delete with
    /// a collapsed caret removes the char before it. The resulting caret is
    /// left pending only when no explicit caret was given; an explicit caret
    /// discards any pending one.
    ///
    /// # Errors
    ///
    /// `InvalidContent` when `content` is neither text nor a number, and
    /// `History` when the caret does not fit the value.
    pub fn write(
        &mut self,
        content: impl Into<Content>,
        is_delete: bool,
        explicit: Option<Caret>,
    ) -> Result<Commit, EditError> {
        let content = content.into().normalize()?;

        let caret = match explicit {
            Some(caret) => caret,
            None if self.surface.has_focus() => {
                self.caret.current_absolute(&self.surface, &self.ignore)
            }
            None => Caret::collapsed(self.history.len_chars()),
        };

        if is_delete && caret == Caret::collapsed(0) {
            tracing::trace!("Delete at start of value ignored");
            return Ok(self.unchanged());
        }

        let range = if is_delete && caret.is_collapsed() {
            Caret::new(caret.start - 1, caret.end)
        } else {
            caret
        };

        let to = if is_delete {
            String::new()
        } else {
            let current = self.history.value();
            let filtered = filter::filter(&content, &self.filter, &current);
            filter::truncate_to_fit(
                filtered,
                self.history.len_chars(),
                range.len(),
                self.filter.max_length,
            )
        };

        let partial = PartialRecord {
            to,
            caret: range,
            timestamp: self.clock.now_ms(),
        };
        let record = self.history.push(partial).map_err(|e| {
            tracing::error!("Write rejected by history: {e}");
            EditError::from(e)
        })?;

        let pending = match explicit {
            Some(_) => {
                // A caret pending from an earlier edit is stale now.
                self.caret.clear();
                None
            }
            None => {
                let pos = range.end - record.from_len() + record.to_len();
                let caret = Caret::collapsed(pos);
                self.caret.set_pending(caret);
                Some(caret)
            }
        };

        tracing::debug!(
            start = range.start,
            end = range.end,
            inserted = record.to_len(),
            removed = record.from_len(),
            "Write"
        );

        Ok(self.commit(vec![record], pending))
    }

    /// Reverts the latest chain of records.
    ///
    /// Does nothing when there is nothing to undo.
    pub fn undo(&mut self) -> Commit {
        let caret = self.caret.current_absolute(&self.surface, &self.ignore);
        let policy = &self.policy;
        let chain = self
            .history
            .revert_chain(|earlier, later| policy.is_adjacent(earlier, later));
        if chain.is_empty() {
            return self.unchanged();
        }

        let pos = fold::undo_caret(&chain, caret.start);
        tracing::debug!(records = chain.len(), caret = pos, "Undo");
        self.caret.set_pending(Caret::collapsed(pos));
        self.commit(chain, Some(Caret::collapsed(pos)))
    }

    /// Reapplies the next chain of reverted records.
    ///
    /// Does nothing when there is nothing to redo.
    pub fn redo(&mut self) -> Commit {
        let caret = self.caret.current_absolute(&self.surface, &self.ignore);
        let policy = &self.policy;
        let chain = self
            .history
            .apply_chain(|earlier, later| policy.is_adjacent(earlier, later));
        if chain.is_empty() {
            return self.unchanged();
        }

        let pos = fold::redo_caret(&chain, caret.start);
        tracing::debug!(records = chain.len(), caret = pos, "Redo");
        self.caret.set_pending(Caret::collapsed(pos));
        self.commit(chain, Some(Caret::collapsed(pos)))
    }

    /// Applies the pending caret to the surface. Hosts call this once after
    /// every render.
    pub fn after_render(&mut self) -> Option<Caret> {
        let caret = self.caret.consume_pending()?;
        self.surface
            .set_absolute_range(caret.start, caret.end, &self.ignore);
        Some(caret)
    }

    /// Current value, as folded from the log.
    pub fn value(&self) -> String {
        self.history.value()
    }

    /// Live selection on the surface, in logical and rendered offsets.
    pub fn selection_range(&self) -> SelectionRange {
        SelectionRange {
            absolute: self.surface.absolute_range(&self.ignore),
            visual: self.surface.visual_range(),
        }
    }

    /// Moves the selection on the surface, dropping any pending caret.
    pub fn set_selection_range(&mut self, start: usize, end: usize) {
        self.caret.clear();
        let len = self.history.len_chars();
        let range = Caret::new(start, end).clamp(len);
        self.surface
            .set_absolute_range(range.start, range.end, &self.ignore);
    }

    /// The full log, for persistence.
    pub fn records(&self) -> &[EditRecord] {
        self.history.records()
    }

    /// Gives the surface focus.
    pub fn focus(&mut self) {
        self.surface.focus();
    }

    /// Whether there is an applied record to revert.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether there is a reverted record to reapply.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// The underlying history log.
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Caret waiting for the next [`Editor::after_render`].
    pub fn pending_caret(&self) -> Option<Caret> {
        self.caret.pending()
    }

    /// Chain policy used by undo and redo.
    pub fn policy(&self) -> &ChainPolicy {
        &self.policy
    }

    /// The rendering surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The rendering surface, for host-driven selection changes.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Renders the new value and notifies the observer.
    fn commit(&mut self, records: Vec<EditRecord>, caret: Option<Caret>) -> Commit {
        let value = self.history.value();
        self.surface.render(&value);
        if let Some(observer) = self.observer.as_mut() {
            for record in &records {
                observer(record, &value);
            }
        }
        Commit {
            records,
            value,
            caret,
        }
    }

    fn unchanged(&self) -> Commit {
        Commit {
            records: Vec::new(),
            value: self.history.value(),
            caret: self.caret.pending(),
        }
    }
}
