/// Pending caret bookkeeping.
use crate::history::Caret;
use crate::surface::RenderSurface;

/// Holds the caret an edit wants, until the host has re-rendered.
///
/// Applying a caret before the surface shows the new value would place it
/// against stale rendered offsets, so edits park it here and
/// [`crate::Editor::after_render`] consumes it once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaretTracker {
    pending: Option<Caret>,
}

impl CaretTracker {
    /// A tracker with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks `caret` until the next render, replacing any pending one.
    pub fn set_pending(&mut self, caret: Caret) {
        self.pending = Some(caret);
    }

    /// Takes the pending caret, leaving none.
    pub fn consume_pending(&mut self) -> Option<Caret> {
        self.pending.take()
    }

    /// Peeks at the pending caret without consuming it.
    pub fn pending(&self) -> Option<Caret> {
        self.pending
    }

    /// Drops the pending caret.
    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// The caret edits should use: the pending one if any, else the
    /// surface's live selection in logical offsets.
    pub fn current_absolute<S>(&self, surface: &S, ignore: &[String]) -> Caret
    where
        S: RenderSurface + ?Sized,
    {
        self.pending
            .unwrap_or_else(|| surface.absolute_range(ignore))
    }
}
