use std::sync::{Arc, RwLock};

use super::InputChange;

/// Internal state for a ControlledInput
#[derive(Debug, Default)]
struct InputInner {
    /// Text currently displayed
    value: String,
    /// Caret position (character offset)
    caret: usize,
    /// Caret offset recorded by the last local edit or caret move
    recorded: Option<usize>,
}

impl InputInner {
    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    /// Applies a local edit: the caret is recorded before the change leaves
    /// the widget.
    fn edited(&mut self, caret: usize) -> InputChange {
        self.caret = caret;
        self.recorded = Some(caret);
        InputChange {
            value: self.value.clone(),
            caret,
        }
    }
}

/// Byte index of a character offset, or the end of the string.
fn byte_index(value: &str, chars: usize) -> usize {
    value
        .char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(value.len())
}

/// A single-line text input whose value is owned by outside state.
///
/// Local edits update the displayed text immediately and hand the new value
/// upward as an [`InputChange`]. The owner later calls [`render`] with
/// whatever value the surrounding state settled on, which may be the same
/// text, a reformatted one, or something else entirely. `render` puts the
/// caret back where the last local edit left it instead of jumping to the
/// end of the text.
///
/// Offsets are counted in characters. When the rendered value is shorter
/// than the recorded offset the caret clamps to the end of the value; the
/// recorded offset itself is kept, so a later longer value restores it.
///
/// # Example
///
/// ```
/// use tablesync_lib::input::ControlledInput;
///
/// let input = ControlledInput::with_value("abcdef");
/// input.set_caret(3);
///
/// // An update from elsewhere re-renders the same value.
/// input.render("abcdef");
/// assert_eq!(input.caret(), 3);
/// ```
///
/// [`render`]: ControlledInput::render
#[derive(Debug, Clone, Default)]
pub struct ControlledInput {
    inner: Arc<RwLock<InputInner>>,
}

impl ControlledInput {
    /// Create a new empty input
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an input showing an initial value, caret at the end
    pub fn with_value(value: impl Into<String>) -> Self {
        let value = value.into();
        let caret = value.chars().count();
        Self {
            inner: Arc::new(RwLock::new(InputInner {
                value,
                caret,
                recorded: None,
            })),
        }
    }

    // -------------------------------------------------------------------------
    // Read methods
    // -------------------------------------------------------------------------

    /// Get the displayed text
    pub fn value(&self) -> String {
        self.inner
            .read()
            .map(|guard| guard.value.clone())
            .unwrap_or_default()
    }

    /// Get the caret position (character offset)
    pub fn caret(&self) -> usize {
        self.inner.read().map(|guard| guard.caret).unwrap_or(0)
    }

    /// Get the caret offset that the next render will restore
    pub fn recorded_caret(&self) -> Option<usize> {
        self.inner.read().ok().and_then(|guard| guard.recorded)
    }

    /// Check if the input is empty
    pub fn is_empty(&self) -> bool {
        self.inner
            .read()
            .map(|guard| guard.value.is_empty())
            .unwrap_or(true)
    }

    /// Get the length of the displayed text in characters
    pub fn len(&self) -> usize {
        self.inner.read().map(|guard| guard.char_len()).unwrap_or(0)
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Post-render hook: show the value the outside state settled on.
    ///
    /// The caret goes to the recorded offset clamped to the new length, or
    /// to the end of the text if nothing was recorded. Returns the caret.
    pub fn render(&self, value: &str) -> usize {
        let Ok(mut guard) = self.inner.write() else {
            return 0;
        };
        if guard.value != value {
            guard.value = value.to_string();
        }
        let len = guard.char_len();
        let caret = guard.recorded.map_or(len, |recorded| recorded.min(len));
        guard.caret = caret;
        caret
    }

    /// Move the caret, clamped to the text length
    pub fn set_caret(&self, position: usize) {
        if let Ok(mut guard) = self.inner.write() {
            let caret = position.min(guard.char_len());
            guard.caret = caret;
            guard.recorded = Some(caret);
        }
    }

    // -------------------------------------------------------------------------
    // Local edits (called on key events)
    // -------------------------------------------------------------------------

    /// Insert a character at the caret
    pub fn insert_char(&self, c: char) -> Option<InputChange> {
        let mut guard = self.inner.write().ok()?;
        let at = byte_index(&guard.value, guard.caret);
        guard.value.insert(at, c);
        let caret = guard.caret + 1;
        Some(guard.edited(caret))
    }

    /// Insert a string at the caret (paste)
    pub fn insert_str(&self, text: &str) -> Option<InputChange> {
        let text: String = text.chars().filter(|c| !c.is_control()).collect();
        if text.is_empty() {
            return None;
        }
        let mut guard = self.inner.write().ok()?;
        let at = byte_index(&guard.value, guard.caret);
        guard.value.insert_str(at, &text);
        let caret = guard.caret + text.chars().count();
        Some(guard.edited(caret))
    }

    /// Delete the character before the caret (backspace)
    pub fn delete_char_before(&self) -> Option<InputChange> {
        let mut guard = self.inner.write().ok()?;
        if guard.caret == 0 {
            return None;
        }
        let caret = guard.caret - 1;
        let at = byte_index(&guard.value, caret);
        guard.value.remove(at);
        Some(guard.edited(caret))
    }

    /// Delete the character at the caret (delete key)
    pub fn delete_char_at(&self) -> Option<InputChange> {
        let mut guard = self.inner.write().ok()?;
        if guard.caret >= guard.char_len() {
            return None;
        }
        let caret = guard.caret;
        let at = byte_index(&guard.value, caret);
        guard.value.remove(at);
        Some(guard.edited(caret))
    }

    /// Move caret left
    pub fn caret_left(&self) {
        if let Ok(guard) = self.inner.read()
            && guard.caret > 0
        {
            let caret = guard.caret - 1;
            drop(guard);
            self.set_caret(caret);
        }
    }

    /// Move caret right
    pub fn caret_right(&self) {
        if let Ok(guard) = self.inner.read()
            && guard.caret < guard.char_len()
        {
            let caret = guard.caret + 1;
            drop(guard);
            self.set_caret(caret);
        }
    }

    /// Move caret to start
    pub fn caret_home(&self) {
        self.set_caret(0);
    }

    /// Move caret to end
    pub fn caret_end(&self) {
        self.set_caret(usize::MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caret_preserved_on_identical_render() {
        let input = ControlledInput::with_value("abcdef");
        input.set_caret(3);
        assert_eq!(input.render("abcdef"), 3);
        assert_eq!(input.caret(), 3);
    }

    #[test]
    fn test_caret_clamps_to_shorter_value() {
        let input = ControlledInput::with_value("abcdef");
        input.set_caret(5);
        assert_eq!(input.render("ab"), 2);
        assert_eq!(input.recorded_caret(), Some(5));

        // The recorded offset survives the clamp.
        assert_eq!(input.render("abcdef"), 5);
    }

    #[test]
    fn test_mid_string_typing_keeps_caret() {
        let input = ControlledInput::with_value("helo");
        input.set_caret(3);

        let change = input.insert_char('l').unwrap();
        assert_eq!(change.value, "hello");
        assert_eq!(change.caret, 4);

        // Outside state echoes the value back.
        input.render(&change.value);
        assert_eq!(input.caret(), 4);
    }

    #[test]
    fn test_render_without_recorded_caret_goes_to_end() {
        let input = ControlledInput::new();
        assert_eq!(input.render("query"), 5);
    }

    #[test]
    fn test_multibyte_offsets_are_characters() {
        let input = ControlledInput::with_value("čaj");
        input.set_caret(1);
        let change = input.insert_char('ř').unwrap();
        assert_eq!(change.value, "čřaj");
        assert_eq!(change.caret, 2);

        let change = input.delete_char_before().unwrap();
        assert_eq!(change.value, "čaj");
        assert_eq!(change.caret, 1);
    }

    #[test]
    fn test_edits_at_bounds_are_noops() {
        let input = ControlledInput::with_value("ab");
        assert!(input.delete_char_at().is_none());
        input.caret_home();
        assert!(input.delete_char_before().is_none());
        assert!(input.insert_str("\n").is_none());
    }

    #[test]
    fn test_clones_share_text_and_caret() {
        let input = ControlledInput::with_value("ab");
        let view = input.clone();
        input.insert_char('c');
        view.render("abc");
        assert_eq!(input.value(), "abc");
        assert_eq!(input.caret(), 3);
        assert_eq!(view.recorded_caret(), Some(3));
    }
}
