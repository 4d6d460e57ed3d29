// Re-exports from caretta-mod-history so hosts only need this crate.
pub use caretta_mod_history::chain::{keep_continuity, split_on_blank_space, within_window};
pub use caretta_mod_history::config::resolve_data_dir;
pub use caretta_mod_history::{
    Caret, ChainPolicy, EditRecord, HistoryConfig, HistoryError, HistoryStore, PartialRecord,
    PersistenceLayer,
};
