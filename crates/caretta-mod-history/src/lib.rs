/// Record-based undo/redo history.
///
/// Provides a `HistoryStore` that keeps every edit as a record in an
/// append-only log with an applied/reverted cursor, the adjacency rules
/// that group records into undo steps, and an embedded key-value store
/// (redb) for persisting logs across sessions.
pub mod chain;
pub mod config;
pub mod error;
pub mod persistence;
pub mod record;
pub mod store;

pub use chain::ChainPolicy;
pub use config::HistoryConfig;
pub use error::HistoryError;
pub use persistence::PersistenceLayer;
pub use record::{Caret, EditRecord, PartialRecord};
pub use store::HistoryStore;
