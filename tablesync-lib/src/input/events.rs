//! Key handling for the ControlledInput widget.

use super::ControlledInput;

/// Keys the input reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Char(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
}

/// A local edit, to be handed to whatever owns the input's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputChange {
    /// Text after the edit.
    pub value: String,
    /// Caret after the edit (character offset).
    pub caret: usize,
}

impl ControlledInput {
    /// Handle a key press.
    ///
    /// Returns the change to propagate when the text was edited. Caret
    /// movement is handled locally and returns `None`.
    pub fn on_key(&self, key: EditKey) -> Option<InputChange> {
        match key {
            EditKey::Char(c) if c.is_control() => None,
            EditKey::Char(c) => self.insert_char(c),
            EditKey::Backspace => self.delete_char_before(),
            EditKey::Delete => self.delete_char_at(),
            EditKey::Left => {
                self.caret_left();
                None
            }
            EditKey::Right => {
                self.caret_right();
                None
            }
            EditKey::Home => {
                self.caret_home();
                None
            }
            EditKey::End => {
                self.caret_end();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_produces_changes() {
        let input = ControlledInput::new();
        let change = input.on_key(EditKey::Char('a')).unwrap();
        assert_eq!(change, InputChange { value: "a".into(), caret: 1 });
        let change = input.on_key(EditKey::Char('b')).unwrap();
        assert_eq!(change.value, "ab");
    }

    #[test]
    fn test_navigation_records_caret() {
        let input = ControlledInput::with_value("abcdef");
        assert_eq!(input.on_key(EditKey::Home), None);
        input.on_key(EditKey::Right);
        input.on_key(EditKey::Right);
        assert_eq!(input.recorded_caret(), Some(2));
        assert_eq!(input.render("abcdef"), 2);

        input.on_key(EditKey::End);
        assert_eq!(input.caret(), 6);
        input.on_key(EditKey::Left);
        assert_eq!(input.caret(), 5);
    }

    #[test]
    fn test_control_chars_ignored() {
        let input = ControlledInput::new();
        assert_eq!(input.on_key(EditKey::Char('\t')), None);
        assert!(input.is_empty());
    }
}
