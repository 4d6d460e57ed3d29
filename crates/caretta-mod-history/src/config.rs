/// Configuration and utility functions for the history system.
use std::path::{Path, PathBuf};

use caretta_config::FieldConfig;

/// Time window in milliseconds within which two edits may share an
/// undo step.
pub const DEFAULT_COALESCE_WINDOW_MS: u64 = 600;

/// Maximum number of records kept in a log. Older applied records are
/// folded into the seed value once the log grows past this.
pub const DEFAULT_MAX_RECORDS: usize = 10_000;

/// Configuration for the history system.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Chain coalescing window in milliseconds.
    pub coalesce_window_ms: u64,
    /// Max records per log.
    pub max_records: usize,
    /// Root directory for the persistence database.
    pub data_dir: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            coalesce_window_ms: DEFAULT_COALESCE_WINDOW_MS,
            max_records: DEFAULT_MAX_RECORDS,
            data_dir: resolve_data_dir(),
        }
    }
}

impl From<&FieldConfig> for HistoryConfig {
    fn from(config: &FieldConfig) -> Self {
        Self {
            coalesce_window_ms: config.coalesce_window_ms,
            max_records: config.max_records,
            data_dir: resolve_data_dir(),
        }
    }
}

/// Resolves the data directory path.
///
/// Resolution order:
/// 1. `CARETTA_DATA_DIR` environment variable
/// 2. `caretta/` under the platform data directory
/// 3. `.data/` directory next to the executable
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CARETTA_DATA_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(dir) = dirs::data_dir() {
        return dir.join("caretta");
    }
    let exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("."));
    exe.parent().unwrap_or(Path::new(".")).join(".data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HistoryConfig::default();
        assert_eq!(config.coalesce_window_ms, 600);
        assert_eq!(config.max_records, 10_000);
    }

    #[test]
    fn test_from_field_config() {
        let field = FieldConfig {
            coalesce_window_ms: 250,
            max_records: 42,
            ..FieldConfig::default()
        };
        let config = HistoryConfig::from(&field);
        assert_eq!(config.coalesce_window_ms, 250);
        assert_eq!(config.max_records, 42);
    }

    #[test]
    fn test_resolve_data_dir_with_env_var() {
        // Save and restore env var
        let original = std::env::var("CARETTA_DATA_DIR").ok();
        std::env::set_var("CARETTA_DATA_DIR", "/custom/path");
        let dir = resolve_data_dir();
        assert_eq!(dir, PathBuf::from("/custom/path"));
        match original {
            Some(val) => std::env::set_var("CARETTA_DATA_DIR", val),
            None => std::env::remove_var("CARETTA_DATA_DIR"),
        }
    }
}
