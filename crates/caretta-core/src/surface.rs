/// Rendering surface: what the editor needs from its host.
///
/// The editor never lays text out itself. A host renders the value (possibly
/// through a formatter that injects decorative segments) and reports the
/// live caret back in logical offsets.
use std::fmt;
use std::sync::Arc;

use crate::history::Caret;

/// Marker carried by the separators [`Formatter::grouped`] injects.
pub const SEPARATOR_MARKER: &str = "separator";

/// Host side of an editable field.
pub trait RenderSurface {
    /// Live selection in logical offsets. Segments whose marker is listed in
    /// `ignore` do not count.
    fn absolute_range(&self, ignore: &[String]) -> Caret;

    /// Places the selection at logical offsets `start..end`.
    fn set_absolute_range(&mut self, start: usize, end: usize, ignore: &[String]);

    /// Live selection in rendered offsets, decorations included.
    fn visual_range(&self) -> Caret;

    /// Whether the field currently has input focus.
    fn has_focus(&self) -> bool;

    /// Gives the field input focus.
    fn focus(&mut self);

    /// Re-renders the surface with a new value.
    fn render(&mut self, value: &str);
}

/// A run of rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    /// Tag matched against the editor's ignore list.
    pub marker: Option<String>,
}

impl Segment {
    /// Text that counts toward logical offsets.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marker: None,
        }
    }

    /// Text tagged with `marker`, skipped when the marker is ignored.
    pub fn marked(text: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marker: Some(marker.into()),
        }
    }

    fn len_chars(&self) -> usize {
        self.text.chars().count()
    }

    fn is_ignored(&self, ignore: &[String]) -> bool {
        self.marker
            .as_ref()
            .is_some_and(|marker| ignore.iter().any(|m| m == marker))
    }
}

type FormatFn = dyn Fn(&str) -> Vec<Segment> + Send + Sync;

/// Turns a logical value into rendered segments.
#[derive(Clone)]
pub struct Formatter(Arc<FormatFn>);

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Formatter")
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::plain()
    }
}

impl Formatter {
    /// Renders the value as a single undecorated segment.
    pub fn plain() -> Self {
        Self(Arc::new(|value: &str| vec![Segment::plain(value)]))
    }

    /// Inserts `separator` between every `every` logical chars.
    ///
    /// Separators carry [`SEPARATOR_MARKER`]. `every == 0` renders plain.
    pub fn grouped(every: usize, separator: impl Into<String>) -> Self {
        if every == 0 {
            return Self::plain();
        }
        let separator = separator.into();
        Self(Arc::new(move |value: &str| {
            let chars: Vec<char> = value.chars().collect();
            let mut segments = Vec::with_capacity(chars.len() / every * 2 + 1);
            for (i, chunk) in chars.chunks(every).enumerate() {
                if i > 0 {
                    segments.push(Segment::marked(separator.clone(), SEPARATOR_MARKER));
                }
                segments.push(Segment::plain(chunk.iter().collect::<String>()));
            }
            segments
        }))
    }

    /// Wraps an arbitrary value-to-segments function.
    pub fn custom<F>(format: F) -> Self
    where
        F: Fn(&str) -> Vec<Segment> + Send + Sync + 'static,
    {
        Self(Arc::new(format))
    }

    /// Renders `value` into segments.
    pub fn format(&self, value: &str) -> Vec<Segment> {
        (self.0)(value)
    }
}

/// In-memory [`RenderSurface`], used by the CLI and in tests.
///
/// Like a real text widget, re-rendering only clamps the selection to the
/// new rendered length; it does not know where the caret should go.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    segments: Vec<Segment>,
    /// Selection in rendered offsets.
    selection: Caret,
    focused: bool,
    formatter: Formatter,
    renders: usize,
}

impl MemorySurface {
    /// An unfocused, empty surface with the plain formatter.
    pub fn new() -> Self {
        Self::default()
    }

    /// An unfocused, empty surface rendering through `formatter`.
    pub fn with_formatter(formatter: Formatter) -> Self {
        Self {
            formatter,
            ..Self::default()
        }
    }

    /// Concatenated rendered text, decorations included.
    pub fn rendered_text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// Segments of the last render.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of renders so far.
    pub fn renders(&self) -> usize {
        self.renders
    }

    /// Moves the selection in rendered offsets, as a pointer click would.
    pub fn set_visual_range(&mut self, start: usize, end: usize) {
        self.selection = Caret::new(start, end).clamp(self.visual_len());
    }

    /// Takes input focus away.
    pub fn blur(&mut self) {
        self.focused = false;
    }

    fn visual_len(&self) -> usize {
        self.segments.iter().map(Segment::len_chars).sum()
    }

    fn to_logical(&self, pos: usize, ignore: &[String]) -> usize {
        let mut visual = 0;
        let mut logical = 0;
        for segment in &self.segments {
            let len = segment.len_chars();
            let counted = !segment.is_ignored(ignore);
            if pos <= visual + len {
                return if counted {
                    logical + (pos - visual)
                } else {
                    logical
                };
            }
            visual += len;
            if counted {
                logical += len;
            }
        }
        logical
    }

    /// A logical offset on a segment boundary maps before any ignored
    /// segment that follows it.
    fn to_visual(&self, pos: usize, ignore: &[String]) -> usize {
        let mut visual = 0;
        let mut logical = 0;
        for segment in &self.segments {
            let len = segment.len_chars();
            if segment.is_ignored(ignore) {
                visual += len;
                continue;
            }
            if pos <= logical + len {
                return visual + (pos - logical);
            }
            visual += len;
            logical += len;
        }
        visual
    }
}

impl RenderSurface for MemorySurface {
    fn absolute_range(&self, ignore: &[String]) -> Caret {
        Caret::new(
            self.to_logical(self.selection.start, ignore),
            self.to_logical(self.selection.end, ignore),
        )
    }

    fn set_absolute_range(&mut self, start: usize, end: usize, ignore: &[String]) {
        let start = self.to_visual(start, ignore);
        let end = self.to_visual(end, ignore);
        self.set_visual_range(start, end);
    }

    fn visual_range(&self) -> Caret {
        self.selection
    }

    fn has_focus(&self) -> bool {
        self.focused
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn render(&mut self, value: &str) {
        self.segments = self.formatter.format(value);
        self.renders += 1;
        self.selection = self.selection.clamp(self.visual_len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ignore_separators() -> Vec<String> {
        vec![SEPARATOR_MARKER.to_string()]
    }

    #[test]
    fn test_plain_mapping_is_identity() {
        let mut surface = MemorySurface::new();
        surface.render("hello");
        surface.set_absolute_range(1, 4, &[]);
        assert_eq!(surface.visual_range(), Caret::new(1, 4));
        assert_eq!(surface.absolute_range(&[]), Caret::new(1, 4));
    }

    #[test]
    fn test_empty_surface() {
        let surface = MemorySurface::new();
        assert_eq!(surface.absolute_range(&[]), Caret::collapsed(0));
        assert_eq!(surface.rendered_text(), "");
    }

    #[test]
    fn test_grouped_formatter() {
        let formatter = Formatter::grouped(4, " ");
        let segments = formatter.format("123456789");
        let text: String = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(text, "1234 5678 9");
        assert_eq!(segments[1], Segment::marked(" ", SEPARATOR_MARKER));
        assert!(formatter.format("").is_empty());
    }

    #[test]
    fn test_grouped_zero_is_plain() {
        let segments = Formatter::grouped(0, "-").format("abc");
        assert_eq!(segments, vec![Segment::plain("abc")]);
    }

    #[test]
    fn test_ignored_separators_are_skipped() {
        let ignore = ignore_separators();
        let mut surface = MemorySurface::with_formatter(Formatter::grouped(4, " "));
        surface.render("12345678");
        assert_eq!(surface.rendered_text(), "1234 5678");

        // Before and after the separator both mean logical offset 4.
        surface.set_visual_range(4, 4);
        assert_eq!(surface.absolute_range(&ignore), Caret::collapsed(4));
        surface.set_visual_range(5, 5);
        assert_eq!(surface.absolute_range(&ignore), Caret::collapsed(4));
        surface.set_visual_range(6, 9);
        assert_eq!(surface.absolute_range(&ignore), Caret::new(5, 8));
    }

    #[test]
    fn test_separators_count_when_not_ignored() {
        let mut surface = MemorySurface::with_formatter(Formatter::grouped(4, " "));
        surface.render("12345678");
        surface.set_visual_range(6, 6);
        assert_eq!(surface.absolute_range(&[]), Caret::collapsed(6));
    }

    #[test]
    fn test_logical_boundary_maps_before_separator() {
        let ignore = ignore_separators();
        let mut surface = MemorySurface::with_formatter(Formatter::grouped(4, " "));
        surface.render("12345678");
        surface.set_absolute_range(4, 4, &ignore);
        assert_eq!(surface.visual_range(), Caret::collapsed(4));
        surface.set_absolute_range(5, 8, &ignore);
        assert_eq!(surface.visual_range(), Caret::new(6, 9));
    }

    #[test]
    fn test_render_clamps_selection() {
        let mut surface = MemorySurface::new();
        surface.render("hello world");
        surface.set_visual_range(11, 11);
        surface.render("hi");
        assert_eq!(surface.visual_range(), Caret::collapsed(2));
        assert_eq!(surface.renders(), 2);
    }

    #[test]
    fn test_focus_and_blur() {
        let mut surface = MemorySurface::new();
        assert!(!surface.has_focus());
        surface.focus();
        assert!(surface.has_focus());
        surface.blur();
        assert!(!surface.has_focus());
    }

    #[test]
    fn test_custom_formatter() {
        let formatter = Formatter::custom(|value: &str| {
            vec![Segment::marked("$", "prefix"), Segment::plain(value)]
        });
        let mut surface = MemorySurface::with_formatter(formatter);
        surface.render("42");
        assert_eq!(surface.rendered_text(), "$42");

        let ignore = vec!["prefix".to_string()];
        surface.set_absolute_range(0, 0, &ignore);
        assert_eq!(surface.visual_range(), Caret::collapsed(1));
        assert_eq!(surface.absolute_range(&ignore), Caret::collapsed(0));
    }
}
