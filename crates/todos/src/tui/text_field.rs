use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use unicode_segmentation::UnicodeSegmentation;

/// Single-line text buffer with a grapheme-based cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct TextField {
    text: String,
    cursor: usize,
}

impl TextField {
    pub(super) fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.graphemes(true).count();
        Self { text, cursor }
    }

    pub(super) const fn text(&self) -> &str {
        self.text.as_str()
    }

    pub(super) const fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Text left of the cursor, used to place the terminal cursor.
    pub(super) fn before_cursor(&self) -> &str {
        &self.text[..self.byte_offset(self.cursor)]
    }

    pub(super) fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn len(&self) -> usize {
        self.text.graphemes(true).count()
    }

    fn byte_offset(&self, grapheme: usize) -> usize {
        self.text
            .grapheme_indices(true)
            .nth(grapheme)
            .map_or(self.text.len(), |(offset, _)| offset)
    }

    fn insert(&mut self, ch: char) {
        let at = self.byte_offset(self.cursor);
        self.text.insert(at, ch);
        // A combining mark joins the previous grapheme instead of adding one.
        self.cursor = self.text[..at + ch.len_utf8()].graphemes(true).count();
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let start = self.byte_offset(self.cursor - 1);
        let end = self.byte_offset(self.cursor);
        self.text.replace_range(start..end, "");
        self.cursor -= 1;
    }

    fn delete(&mut self) {
        if self.cursor >= self.len() {
            return;
        }
        let start = self.byte_offset(self.cursor);
        let end = self.byte_offset(self.cursor + 1);
        self.text.replace_range(start..end, "");
    }

    /// Apply an editing key. Returns `false` when the key is not an editing key.
    pub(super) fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let plain = !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
        match key.code {
            KeyCode::Char('u') if key.modifiers == KeyModifiers::CONTROL => self.clear(),
            KeyCode::Char(ch) if plain => self.insert(ch),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(field: &mut TextField, code: KeyCode) -> bool {
        field.handle_key(&KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(field: &mut TextField, text: &str) {
        for ch in text.chars() {
            press(field, KeyCode::Char(ch));
        }
    }

    #[test]
    fn typing_and_cursor_movement() {
        let mut field = TextField::default();
        type_str(&mut field, "milk");
        press(&mut field, KeyCode::Home);
        type_str(&mut field, "Buy ");
        assert_eq!(field.text(), "Buy milk");
        assert_eq!(field.before_cursor(), "Buy ");

        press(&mut field, KeyCode::End);
        press(&mut field, KeyCode::Backspace);
        press(&mut field, KeyCode::Left);
        press(&mut field, KeyCode::Delete);
        assert_eq!(field.text(), "Buy mi");
    }

    #[test]
    fn backspace_removes_whole_grapheme() {
        let mut field = TextField::with_text("cafe");
        type_str(&mut field, "\u{0301}");
        assert_eq!(field.text(), "cafe\u{0301}");

        press(&mut field, KeyCode::Backspace);
        assert_eq!(field.text(), "caf");
    }

    #[test]
    fn control_keys_are_not_inserted() {
        let mut field = TextField::with_text("draft");
        assert!(!field.handle_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(field.handle_key(&KeyEvent::new(KeyCode::Char('U'), KeyModifiers::SHIFT)));
        assert_eq!(field.text(), "draftU");

        assert!(field.handle_key(&KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)));
        assert!(field.is_empty());
        assert!(!press(&mut field, KeyCode::Enter));
    }
}
