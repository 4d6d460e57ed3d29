/// Input-event helpers built on [`Editor::write`].
use super::{Commit, Editor};
use crate::error::EditError;
use crate::history::Caret;
use crate::surface::RenderSurface;

impl<S: RenderSurface> Editor<S> {
    /// Types `text` at the caret.
    pub fn insert(&mut self, text: &str) -> Result<Commit, EditError> {
        self.write(text, false, None)
    }

    /// Deletes the selection, or the char before a collapsed caret.
    pub fn backspace(&mut self) -> Result<Commit, EditError> {
        self.write("", true, None)
    }

    /// Pastes clipboard text, normalizing line endings to `'\n'`.
    pub fn paste(&mut self, text: &str) -> Result<Commit, EditError> {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        self.write(text, false, None)
    }

    /// Removes the selection and returns it. A collapsed caret cuts nothing.
    pub fn cut(&mut self) -> Result<String, EditError> {
        let selection = self.caret.current_absolute(&self.surface, &self.ignore);
        if selection.is_collapsed() {
            return Ok(String::new());
        }
        let commit = self.write("", false, None)?;
        Ok(commit
            .records
            .into_iter()
            .next()
            .map(|record| record.from)
            .unwrap_or_default())
    }

    /// Selects the whole value.
    pub fn select_all(&mut self) {
        let len = self.history.len_chars();
        self.set_selection_range(0, len);
    }

    /// Moves a collapsed caret to `pos`, clamped to the value.
    pub fn move_caret(&mut self, pos: usize) -> Caret {
        self.set_selection_range(pos, pos);
        self.selection_range().absolute
    }
}
