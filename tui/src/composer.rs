use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, WidgetRef},
};

use crate::textarea::TextArea;

/// Shift+Enter only submits on terminals at least this wide. Narrower
/// terminals still send via Ctrl+S.
pub const MIN_SUBMIT_WIDTH: u16 = 80;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum InputResult {
    Submitted(String),
    None,
}

/// The input box under the conversation: a growing textarea with a placeholder
/// prompt and a key-hint line.
pub struct Composer {
    textarea: TextArea,
    placeholder_text: String,
}

impl Composer {
    pub fn new(placeholder_text: String) -> Self {
        Self {
            textarea: TextArea::new(),
            placeholder_text,
        }
    }

    pub fn text(&self) -> &str {
        self.textarea.text()
    }

    pub fn is_empty(&self) -> bool {
        self.textarea.is_empty()
    }

    /// Textarea rows plus the hint line.
    pub fn desired_height(&self, width: u16) -> u16 {
        self.textarea
            .desired_height(width.saturating_sub(2))
            .saturating_add(1)
    }

    /// Trimmed content, clearing the box — or nothing if only whitespace.
    /// Whitespace-only input stays in the box untouched.
    pub fn take_submission(&mut self) -> Option<String> {
        let text = self.textarea.text().trim().to_string();
        if text.is_empty() {
            return None;
        }
        self.textarea.clear();
        Some(text)
    }

    /// Route one key press. Shift+Enter submits when the terminal is wide
    /// enough, suppressing the newline it would otherwise insert; with the
    /// gate unmet it falls through to the textarea as a plain newline.
    pub fn handle_key_event(&mut self, key_event: KeyEvent, term_width: u16) -> (InputResult, bool) {
        if key_event.kind != KeyEventKind::Press {
            return (InputResult::None, false);
        }

        match key_event {
            KeyEvent {
                code: KeyCode::Enter,
                modifiers: KeyModifiers::SHIFT,
                ..
            } if term_width >= MIN_SUBMIT_WIDTH => match self.take_submission() {
                Some(text) => (InputResult::Submitted(text), true),
                None => (InputResult::None, false),
            },
            other => {
                self.textarea.input(other);
                (InputResult::None, true)
            }
        }
    }

    pub fn cursor_pos(&self, area: Rect) -> Option<(u16, u16)> {
        let [textarea_rect, _] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);
        let content = Rect {
            x: textarea_rect.x + 2,
            y: textarea_rect.y,
            width: textarea_rect.width.saturating_sub(2),
            height: textarea_rect.height,
        };
        self.textarea.cursor_pos(content)
    }

    fn render_hints(&self, area: Rect, buf: &mut Buffer) {
        let mut hints: Vec<(&str, &str)> = Vec::new();
        // Only advertise the gated shortcut where it actually submits.
        if area.width >= MIN_SUBMIT_WIDTH {
            hints.push(("Shift+Enter", "send"));
        }
        hints.push(("Ctrl+S", "send"));
        hints.push(("Ctrl+T", "hide"));
        hints.push(("Ctrl+C", "quit"));

        let mut spans = vec![Span::raw(" ")];
        for (i, (key, desc)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(*key, Style::default().fg(Color::Cyan)));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                *desc,
                Style::default().add_modifier(Modifier::DIM),
            ));
        }
        Paragraph::new(Line::from(spans))
            .style(Style::default().add_modifier(Modifier::DIM))
            .render_ref(area, buf);
    }
}

impl WidgetRef for &Composer {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let [textarea_rect, hint_rect] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);

        let border_style = Style::default().fg(Color::Rgb(144, 238, 144));
        Block::default()
            .borders(Borders::LEFT)
            .border_style(border_style)
            .render_ref(
                Rect::new(textarea_rect.x, textarea_rect.y, 1, textarea_rect.height),
                buf,
            );

        let content = Rect {
            x: textarea_rect.x + 2,
            y: textarea_rect.y,
            width: textarea_rect.width.saturating_sub(2),
            height: textarea_rect.height,
        };

        if self.textarea.is_empty() && !self.placeholder_text.is_empty() {
            let placeholder = Line::from(Span::styled(
                &self.placeholder_text,
                Style::default().add_modifier(Modifier::DIM),
            ));
            Paragraph::new(vec![placeholder]).render_ref(content, buf);
        } else {
            WidgetRef::render_ref(&&self.textarea, content, buf);
        }

        if hint_rect.height > 0 {
            self.render_hints(hint_rect, buf);
        }
    }
}
