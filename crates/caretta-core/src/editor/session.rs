//! Saving and restoring an editor's history through the persistence layer.

use anyhow::{Context, Result};

use super::{Editor, EditorOptions};
use crate::history::PersistenceLayer;
use crate::surface::RenderSurface;

impl<S: RenderSurface> Editor<S> {
    /// Creates an editor from the log stored under `doc_id`, or from
    /// `options` alone if nothing is stored yet.
    ///
    /// A stored log replaces `options.config.initial_value` and
    /// `options.initial_records`.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the stored log is inconsistent.
    pub fn open_session(
        surface: S,
        mut options: EditorOptions,
        persistence: &PersistenceLayer,
        doc_id: &str,
    ) -> Result<Self> {
        if let Some(store) = persistence.load_store(doc_id)? {
            tracing::info!(doc_id, records = store.records().len(), "Restoring session");
            options.config.initial_value = store.seed().to_string();
            options.initial_records = store.records().to_vec();
        }
        Editor::new(surface, options)
            .with_context(|| format!("Failed to restore session {doc_id}"))
    }

    /// Writes the seed and the full log under `doc_id`, replacing what was
    /// stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the write transaction fails.
    pub fn save_session(&self, persistence: &PersistenceLayer, doc_id: &str) -> Result<()> {
        persistence.save_store(doc_id, &self.history)?;
        tracing::debug!(doc_id, records = self.history.records().len(), "Saved session");
        Ok(())
    }
}
