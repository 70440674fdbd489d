//! Single-line text input used by the board popups.

/// A text input field. `cursor` counts characters, not bytes.
#[derive(Clone, Debug, Default)]
pub struct InputField {
    pub value: String,
    pub cursor: usize,
}

impl InputField {
    pub fn new() -> Self {
        Self::default()
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    /// Insert a character at the current cursor position.
    pub fn handle_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    pub fn handle_backspace(&mut self) {
        if self.cursor > 0 {
            let at = self.byte_offset(self.cursor - 1);
            self.value.remove(at);
            self.cursor -= 1;
        }
    }

    /// Delete the character at the cursor position.
    pub fn handle_delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_offset(self.cursor);
            self.value.remove(at);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    /// Hand back the trimmed text and reset the field.
    pub fn take(&mut self) -> String {
        let text = self.value.trim().to_string();
        self.value.clear();
        self.cursor = 0;
        text
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editing_multibyte_text() {
        let mut input = InputField::new();
        for c in "caf\u{e9}!".chars() {
            input.handle_char(c);
        }
        input.handle_backspace();
        assert_eq!(input.value, "caf\u{e9}");
        input.move_cursor_left();
        input.handle_delete();
        assert_eq!(input.value, "caf");
        input.move_cursor_left();
        input.handle_char('l');
        assert_eq!(input.value, "calf");
    }

    #[test]
    fn test_take_trims_and_resets() {
        let mut input = InputField::new();
        for c in "  waiting on X ".chars() {
            input.handle_char(c);
        }
        assert_eq!(input.take(), "waiting on X");
        assert!(input.value.is_empty());
        assert_eq!(input.cursor, 0);
        input.move_cursor_right();
        assert_eq!(input.cursor, 0);
    }
}
