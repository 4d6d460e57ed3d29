/// Editable-text engine.
///
/// Turns raw input events (typed text, paste, cut, backspace) into records
/// of a history log, keeps the caret consistent across a re-rendering
/// surface, and filters what may enter the value. The [`Editor`] is the
/// entry point; everything else is a collaborator it drives.
pub mod caret;
pub mod clock;
pub mod content;
pub mod editor;
pub mod error;
pub mod filter;
pub mod history;
pub mod surface;

pub use caret::CaretTracker;
pub use clock::{Clock, ManualClock, SystemClock};
pub use content::Content;
pub use editor::{Commit, Editor, EditorOptions, SelectionRange};
pub use error::EditError;
pub use filter::{CustomFilter, FilterOptions};
pub use history::{Caret, ChainPolicy, EditRecord, HistoryStore};
pub use surface::{Formatter, MemorySurface, RenderSurface, Segment};
