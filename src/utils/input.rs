//! Prompt editing state and text sanitising.

/// Makes pasted or typed text safe to render in the TUI.
///
/// Tabs become four spaces, carriage returns become newlines, and other
/// control characters are dropped.
pub fn sanitize_text_input(text: &str) -> String {
    let mut sanitized = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '\t' => sanitized.push_str("    "),
            '\r' => sanitized.push('\n'),
            '\n' => sanitized.push(c),
            _ if !c.is_control() => sanitized.push(c),
            _ => {}
        }
    }

    sanitized
}

/// Editable prompt text with a cursor measured in characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    chars: Vec<char>,
    cursor: usize,
}

impl InputBuffer {
    pub fn with_text(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let cursor = chars.len();
        Self { chars, cursor }
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn insert(&mut self, ch: char) {
        self.chars.insert(self.cursor, ch);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.insert(ch);
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.chars.remove(self.cursor);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.chars.len() {
            self.chars.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.chars.len());
    }

    pub fn clear(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_expands_tabs_and_normalizes_returns() {
        assert_eq!(sanitize_text_input("a\tb"), "a    b");
        assert_eq!(sanitize_text_input("a\rb"), "a\nb");
        assert_eq!(
            sanitize_text_input("hello\x07\tworld\r\ntest"),
            "hello    world\n\ntest"
        );
    }

    #[test]
    fn sanitize_keeps_unicode() {
        assert_eq!(sanitize_text_input("你好 🌍"), "你好 🌍");
    }

    #[test]
    fn edits_happen_at_the_cursor() {
        let mut input = InputBuffer::with_text("hllo");
        assert_eq!(input.cursor(), 4);
        for _ in 0..3 {
            input.move_left();
        }
        input.insert('e');
        assert_eq!(input.text(), "hello");
        assert_eq!(input.cursor(), 2);

        input.delete();
        assert_eq!(input.text(), "helo");
        input.backspace();
        assert_eq!(input.text(), "hlo");
        assert_eq!(input.cursor(), 1);
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut input = InputBuffer::default();
        input.move_left();
        input.backspace();
        input.delete();
        assert_eq!(input.cursor(), 0);

        input.insert_str("你好");
        input.move_right();
        assert_eq!(input.cursor(), 2);
        assert_eq!(input.text(), "你好");
        input.clear();
        assert!(input.is_empty());
        assert_eq!(input.cursor(), 0);
    }
}
