/// Single-line editor used by filter prompts and config fields.
///
/// The cursor counts characters, not bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextInput {
    pub value: String,
    pub cursor: usize,
}

impl TextInput {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.clamp_cursor(self.cursor.saturating_sub(1));
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor = self.clamp_cursor(self.cursor.saturating_add(1));
    }

    pub fn enter_char(&mut self, new_char: char) {
        let index = self.byte_index();
        self.value.insert(index, new_char);
        self.move_cursor_right();
    }

    pub fn delete_char(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let before = self.value.chars().take(self.cursor - 1);
        let after = self.value.chars().skip(self.cursor);
        self.value = before.chain(after).collect();
        self.move_cursor_left();
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .map(|(i, _)| i)
            .nth(self.cursor)
            .unwrap_or(self.value.len())
    }

    fn clamp_cursor(&self, new_cursor_pos: usize) -> usize {
        new_cursor_pos.clamp(0, self.value.chars().count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_delete_at_cursor() {
        let mut input = TextInput::new("akv");
        input.enter_char('a');
        assert_eq!(input.value, "akva");

        input.move_cursor_left();
        input.move_cursor_left();
        input.delete_char();
        assert_eq!(input.value, "aka");
        assert_eq!(input.cursor, 1);
    }

    #[test]
    fn test_cursor_stays_in_bounds_with_multibyte_chars() {
        let mut input = TextInput::new("jaula ñ");
        for _ in 0..20 {
            input.move_cursor_right();
        }
        assert_eq!(input.cursor, 7);
        input.enter_char('!');
        assert_eq!(input.value, "jaula ñ!");

        let mut empty = TextInput::default();
        empty.delete_char();
        empty.move_cursor_left();
        assert_eq!(empty.cursor, 0);
    }
}
