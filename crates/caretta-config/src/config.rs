/// Field configuration: load, save, and sanitize.
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Allowed and denied characters for a field.
///
/// A character survives filtering only if it is in `include` (when set)
/// and not in `exclude` (when set).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterSet {
    pub include: Option<BTreeSet<char>>,
    pub exclude: Option<BTreeSet<char>>,
}

impl CharacterSet {
    /// Only the chars of `chars` are accepted.
    pub fn including(chars: &str) -> Self {
        Self {
            include: Some(chars.chars().collect()),
            exclude: None,
        }
    }

    /// Every char except those of `chars` is accepted.
    pub fn excluding(chars: &str) -> Self {
        Self {
            include: None,
            exclude: Some(chars.chars().collect()),
        }
    }

    /// Adds `ch` to the exclusion set, creating it if needed.
    pub fn exclude_char(&mut self, ch: char) {
        self.exclude.get_or_insert_with(BTreeSet::new).insert(ch);
    }

    /// Returns true if `ch` passes both sets.
    pub fn allows(&self, ch: char) -> bool {
        self.include.as_ref().map_or(true, |set| set.contains(&ch))
            && self.exclude.as_ref().map_or(true, |set| !set.contains(&ch))
    }
}

/// Construction-time configuration of an editable field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Value the field starts with.
    pub initial_value: String,
    /// Multi-line field. Single-line fields never accept `'\n'`.
    pub area: bool,
    pub character_set: Option<CharacterSet>,
    /// Maximum value length in chars. `None` = unlimited.
    pub max_length: Option<usize>,
    /// Max gap between two edits sharing an undo step, in milliseconds.
    pub coalesce_window_ms: u64,
    /// Markers of rendered segments that do not count toward caret offsets.
    pub ignore: Vec<String>,
    /// Max records kept in the history log.
    pub max_records: usize,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            initial_value: String::new(),
            area: false,
            character_set: None,
            max_length: None,
            coalesce_window_ms: 600,
            ignore: Vec::new(),
            max_records: 10_000,
        }
    }
}

impl FieldConfig {
    /// Returns the default config file path: platform config dir + `caretta/caretta.json`.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("caretta").join("caretta.json"))
            .unwrap_or_else(|| PathBuf::from("caretta.json"))
    }

    /// Loads config from `path`, creating a default file if it doesn't exist.
    /// Returns defaults on any error (missing file, parse error, etc.).
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            match Self::load(path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {}: {e:#}", path.display());
                }
            }
            // Return defaults on error (don't overwrite broken file)
            Self::default()
        } else {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                tracing::warn!("Failed to create default config at {}: {e}", path.display());
            }
            config
        }
    }

    /// Loads and sanitizes config from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let mut config: FieldConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.sanitize();
        Ok(config)
    }

    /// Saves config to `path` as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Clamps values to valid ranges and resets invalid fields.
    pub fn sanitize(&mut self) {
        self.coalesce_window_ms = self.coalesce_window_ms.max(1);
        self.max_records = self.max_records.max(1);

        if let Some(max) = self.max_length {
            if self.initial_value.chars().count() > max {
                tracing::warn!("Initial value longer than max_length {max}, truncating");
                self.initial_value = self.initial_value.chars().take(max).collect();
            }
        }
        if !self.area && self.initial_value.contains('\n') {
            self.initial_value = self.initial_value.replace('\n', "");
        }
    }
}
