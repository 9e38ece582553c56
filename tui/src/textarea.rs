use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{buffer::Buffer, layout::Rect, style::Style, widgets::WidgetRef};
use std::cell::RefCell;
use std::ops::Range;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Multi-line input box. Its desired height tracks the wrapped content, so the
/// composer grows with every keystroke and falls back to one row when cleared.
#[derive(Debug)]
pub struct TextArea {
    text: String,
    cursor: usize,
    wrap_cache: RefCell<Option<(u16, Vec<Range<usize>>)>>,
}

impl TextArea {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            wrap_cache: RefCell::new(None),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
        self.wrap_cache.replace(None);
    }

    pub fn insert_str(&mut self, s: &str) {
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
        self.wrap_cache.replace(None);
    }

    /// Rows needed to show the full content at `width`; at least one.
    pub fn desired_height(&self, width: u16) -> u16 {
        self.line_ranges(width).len().max(1) as u16
    }

    pub fn input(&mut self, ev: KeyEvent) {
        match ev {
            KeyEvent {
                code: KeyCode::Char(c),
                modifiers: KeyModifiers::NONE | KeyModifiers::SHIFT,
                ..
            } => self.insert_str(&c.to_string()),
            KeyEvent {
                code: KeyCode::Enter,
                ..
            } => self.insert_str("\n"),
            KeyEvent {
                code: KeyCode::Backspace,
                ..
            } => self.delete_before_cursor(),
            KeyEvent {
                code: KeyCode::Left,
                ..
            } => self.move_left(),
            KeyEvent {
                code: KeyCode::Right,
                ..
            } => self.move_right(),
            KeyEvent {
                code: KeyCode::Home,
                ..
            } => self.cursor = 0,
            KeyEvent {
                code: KeyCode::End, ..
            } => self.cursor = self.text.len(),
            _ => {}
        }
    }

    fn delete_before_cursor(&mut self) {
        if let Some((idx, _)) = self.text[..self.cursor].char_indices().next_back() {
            self.text.replace_range(idx..self.cursor, "");
            self.cursor = idx;
            self.wrap_cache.replace(None);
        }
    }

    fn move_left(&mut self) {
        if let Some((idx, _)) = self.text[..self.cursor].char_indices().next_back() {
            self.cursor = idx;
        }
    }

    fn move_right(&mut self) {
        if let Some(c) = self.text[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    /// Screen position of the cursor inside `area`, if it fits.
    pub fn cursor_pos(&self, area: Rect) -> Option<(u16, u16)> {
        let lines = self.line_ranges(area.width);
        let row = lines
            .iter()
            .position(|r| self.cursor >= r.start && self.cursor <= r.end)
            .unwrap_or(lines.len().saturating_sub(1));
        let start = lines.get(row).map(|r| r.start).unwrap_or(0);
        let col = self.text[start..self.cursor].width() as u16;
        if (row as u16) < area.height {
            Some((area.x + col.min(area.width.saturating_sub(1)), area.y + row as u16))
        } else {
            None
        }
    }

    /// Byte ranges of the display lines at `width`, hard-wrapping long lines
    /// and honoring embedded newlines. Cached per width.
    fn line_ranges(&self, width: u16) -> Vec<Range<usize>> {
        if width == 0 {
            return vec![0..self.text.len()];
        }
        if let Some((w, lines)) = self.wrap_cache.borrow().as_ref() {
            if *w == width {
                return lines.clone();
            }
        }

        let mut lines = Vec::new();
        let mut start = 0usize;
        let mut line_width = 0usize;
        for (i, ch) in self.text.char_indices() {
            if ch == '\n' {
                lines.push(start..i);
                start = i + 1;
                line_width = 0;
                continue;
            }
            let w = ch.width().unwrap_or(0);
            if line_width + w > width as usize {
                lines.push(start..i);
                start = i;
                line_width = 0;
            }
            line_width += w;
        }
        lines.push(start..self.text.len());

        self.wrap_cache.replace(Some((width, lines.clone())));
        lines
    }
}

impl Default for TextArea {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetRef for &TextArea {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let lines = self.line_ranges(area.width);
        for (row, range) in lines.iter().enumerate().take(area.height as usize) {
            let y = area.y + row as u16;
            buf.set_string(area.x, y, &self.text[range.clone()], Style::default());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_grows_with_content_and_resets_when_cleared() {
        let mut ta = TextArea::new();
        assert_eq!(ta.desired_height(10), 1);

        ta.insert_str("line one\nline two");
        assert_eq!(ta.desired_height(10), 2);

        ta.insert_str("\nand a third line that wraps");
        assert!(ta.desired_height(10) >= 4);

        ta.clear();
        assert_eq!(ta.desired_height(10), 1);
    }

    #[test]
    fn long_line_hard_wraps_at_width() {
        let mut ta = TextArea::new();
        ta.insert_str("abcdefghij");
        assert_eq!(ta.desired_height(4), 3);
    }

    #[test]
    fn backspace_removes_previous_char() {
        let mut ta = TextArea::new();
        ta.insert_str("hé");
        ta.input(KeyEvent::from(KeyCode::Backspace));
        assert_eq!(ta.text(), "h");
        ta.input(KeyEvent::from(KeyCode::Backspace));
        assert!(ta.is_empty());
        ta.input(KeyEvent::from(KeyCode::Backspace));
        assert!(ta.is_empty());
    }
}
