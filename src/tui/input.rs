use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use unicode_width::UnicodeWidthStr;

/// What a key did to the line being edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditResult {
    Edited,
    Moved,
    /// Enter without a newline-inserting modifier
    Commit,
    Ignored,
}

/// Single-line editor state; the text itself lives in the panel
#[derive(Debug, Default)]
pub struct LineEditor {
    /// Byte offset of the cursor, always on a char boundary
    pub cursor_pos: usize,
}

impl LineEditor {
    pub fn handle_key(&mut self, text: &mut String, key: KeyEvent) -> EditResult {
        self.cursor_pos = self.cursor_pos.min(text.len());

        match key.code {
            KeyCode::Enter => {
                if key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) {
                    EditResult::Ignored
                } else {
                    EditResult::Commit
                }
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                text.insert(self.cursor_pos, c);
                self.cursor_pos += c.len_utf8();
                EditResult::Edited
            }
            KeyCode::Backspace => {
                if self.cursor_pos == 0 {
                    return EditResult::Ignored;
                }
                let prev = prev_boundary(text, self.cursor_pos);
                text.remove(prev);
                self.cursor_pos = prev;
                EditResult::Edited
            }
            KeyCode::Delete => {
                if self.cursor_pos >= text.len() {
                    return EditResult::Ignored;
                }
                text.remove(self.cursor_pos);
                EditResult::Edited
            }
            KeyCode::Left => {
                self.cursor_pos = prev_boundary(text, self.cursor_pos);
                EditResult::Moved
            }
            KeyCode::Right => {
                self.cursor_pos = next_boundary(text, self.cursor_pos);
                EditResult::Moved
            }
            KeyCode::Home => {
                self.cursor_pos = 0;
                EditResult::Moved
            }
            KeyCode::End => {
                self.cursor_pos = text.len();
                EditResult::Moved
            }
            _ => EditResult::Ignored,
        }
    }

    /// Clear the line and reset the cursor
    pub fn clear(&mut self, text: &mut String) {
        text.clear();
        self.cursor_pos = 0;
    }

    /// Display column of the cursor
    pub fn cursor_column(&self, text: &str) -> u16 {
        let end = self.cursor_pos.min(text.len());
        text[..end].width() as u16
    }
}

fn prev_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .last()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn next_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(editor: &mut LineEditor, text: &mut String, s: &str) {
        for c in s.chars() {
            editor.handle_key(text, key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn typing_and_backspace_handle_multibyte_chars() {
        let mut editor = LineEditor::default();
        let mut text = String::new();
        type_str(&mut editor, &mut text, "héllo");
        assert_eq!(text, "héllo");
        assert_eq!(editor.cursor_pos, text.len());

        editor.handle_key(&mut text, key(KeyCode::Left));
        editor.handle_key(&mut text, key(KeyCode::Left));
        editor.handle_key(&mut text, key(KeyCode::Left));
        editor.handle_key(&mut text, key(KeyCode::Backspace));
        assert_eq!(text, "hllo");
        assert_eq!(editor.cursor_pos, 1);

        editor.handle_key(&mut text, key(KeyCode::Delete));
        assert_eq!(text, "hlo");
    }

    #[test]
    fn enter_commits_but_shift_enter_does_not() {
        let mut editor = LineEditor::default();
        let mut text = String::from("q");
        assert_eq!(editor.handle_key(&mut text, key(KeyCode::Enter)), EditResult::Commit);
        assert_eq!(
            editor.handle_key(&mut text, KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT)),
            EditResult::Ignored
        );
        assert_eq!(text, "q");
    }

    #[test]
    fn control_chords_are_not_typed() {
        let mut editor = LineEditor::default();
        let mut text = String::new();
        let result =
            editor.handle_key(&mut text, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(result, EditResult::Ignored);
        assert!(text.is_empty());
    }

    #[test]
    fn cursor_column_uses_display_width() {
        let mut editor = LineEditor::default();
        let mut text = String::new();
        type_str(&mut editor, &mut text, "日本");
        assert_eq!(editor.cursor_column(&text), 4);
        editor.handle_key(&mut text, key(KeyCode::Home));
        assert_eq!(editor.cursor_column(&text), 0);
    }
}
