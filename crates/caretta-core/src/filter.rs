/// Content filtering: character sets, custom transforms, length limits.
use std::fmt;
use std::sync::Arc;

use caretta_config::{CharacterSet, FieldConfig};

/// Transform applied after the character sets.
///
/// Receives the already-filtered content and the current value, returns the
/// text to insert. It may grow or shrink the content.
pub type CustomFilter = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;

/// What a field lets through.
#[derive(Clone, Default)]
pub struct FilterOptions {
    /// Multi-line field. When false, `'\n'` is always dropped.
    pub area: bool,
    pub character_set: Option<CharacterSet>,
    pub custom: Option<CustomFilter>,
    /// Maximum value length in chars.
    pub max_length: Option<usize>,
}

impl fmt::Debug for FilterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterOptions")
            .field("area", &self.area)
            .field("character_set", &self.character_set)
            .field("custom", &self.custom.is_some())
            .field("max_length", &self.max_length)
            .finish()
    }
}

impl FilterOptions {
    /// Filtering rules of a field, without a custom transform.
    pub fn from_config(config: &FieldConfig) -> Self {
        Self {
            area: config.area,
            character_set: config.character_set.clone(),
            custom: None,
            max_length: config.max_length,
        }
    }

    /// Installs a custom transform.
    pub fn with_custom(mut self, custom: CustomFilter) -> Self {
        self.custom = Some(custom);
        self
    }
}

/// Returns the part of `content` allowed into the value.
///
/// Characters must be in the include set (when present) and outside the
/// exclude set. Single-line fields treat `'\n'` as excluded. The custom
/// filter, if any, runs last and sees `current_value`.
pub fn filter(content: &str, options: &FilterOptions, current_value: &str) -> String {
    let allowed: String = content
        .chars()
        .filter(|&ch| {
            (options.area || ch != '\n')
                && options
                    .character_set
                    .as_ref()
                    .map_or(true, |set| set.allows(ch))
        })
        .collect();

    let result = match &options.custom {
        Some(custom) => custom(&allowed, current_value),
        None => allowed,
    };

    tracing::trace!(
        input = content.chars().count(),
        output = result.chars().count(),
        "Filtered content"
    );
    result
}

/// Keeps the longest prefix of `filtered` that fits in `max_length`.
///
/// `current_len` is the value's length and `replaced_len` the length of the
/// range being replaced, both in chars.
pub fn truncate_to_fit(
    filtered: String,
    current_len: usize,
    replaced_len: usize,
    max_length: Option<usize>,
) -> String {
    let Some(max) = max_length else {
        return filtered;
    };
    let room = max.saturating_sub(current_len.saturating_sub(replaced_len));
    if filtered.chars().count() <= room {
        return filtered;
    }
    filtered.chars().take(room).collect()
}
