const MAX_INPUT_LEN: usize = 256;

/// Single-line text input with a character caret.
#[derive(Debug, Clone, Default)]
pub(crate) struct TextInput {
    value: String,
    cursor: usize,
    masked: bool,
}

impl TextInput {
    pub fn masked() -> Self {
        Self {
            masked: true,
            ..Self::default()
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Text to draw; masked inputs echo one `*` per character.
    pub fn display(&self) -> String {
        if self.masked {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.value.chars().count() as isize;
        self.cursor = (self.cursor as isize + delta).clamp(0, len) as usize;
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    pub fn insert(&mut self, ch: char) {
        if ch.is_control() || self.value.chars().count() >= MAX_INPUT_LEN {
            return;
        }
        let at = self.byte_offset(self.cursor);
        self.value.insert(at, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_offset(self.cursor);
            self.value.remove(at);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let at = self.byte_offset(self.cursor);
            self.value.remove(at);
        }
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.value
            .char_indices()
            .nth(chars)
            .map(|(idx, _)| idx)
            .unwrap_or(self.value.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_at_the_cursor() {
        let mut input = TextInput::default();
        for ch in "admin@example.com".chars() {
            input.insert(ch);
        }
        input.move_home();
        input.delete();
        input.move_cursor(4);
        input.insert('X');
        assert_eq!(input.value(), "dminX@example.com");
        input.move_end();
        input.backspace();
        assert_eq!(input.value(), "dminX@example.co");
    }

    #[test]
    fn masked_input_hides_its_value() {
        let mut input = TextInput::masked();
        input.insert('p');
        input.insert('w');
        assert_eq!(input.display(), "**");
        assert_eq!(input.value(), "pw");
        input.clear();
        assert_eq!(input.cursor(), 0);
    }
}
