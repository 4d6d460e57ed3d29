/// Errors surfaced by the editor.
use thiserror::Error;

use crate::history::HistoryError;

/// Failures of [`crate::Editor::write`].
///
/// Undo, redo and filtering never fail, so this is the only error type
/// the editor returns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// Content was neither text nor a number.
    #[error("{0}")]
    InvalidContent(String),

    /// The caret and the history log disagree about the value.
    #[error("history out of sync: {0}")]
    History(#[from] HistoryError),
}
