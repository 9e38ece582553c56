use chatbox_common::{ConversationEntry, Direction, EntryStatus};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Paragraph, Widget},
};

const PREFIX_WIDTH: usize = 5; // "You: " / "Bot: "

/// The scrolling conversation list. Lines are pre-wrapped so the caller can
/// count them and clamp its scroll offset before rendering.
pub struct ChatWidget<'a> {
    entries: &'a [ConversationEntry],
    scroll_top: usize,
}

impl<'a> ChatWidget<'a> {
    pub fn new(entries: &'a [ConversationEntry]) -> Self {
        Self {
            entries,
            scroll_top: 0,
        }
    }

    pub fn with_scroll(mut self, scroll_top: usize) -> Self {
        self.scroll_top = scroll_top;
        self
    }

    /// Display lines at `width`, one entry after another with a blank spacer
    /// between them.
    pub fn build_lines(&self, width: u16) -> Vec<Line<'static>> {
        let mut lines: Vec<Line> = Vec::with_capacity(self.entries.len() * 2);

        for (i, entry) in self.entries.iter().enumerate() {
            lines.extend(entry_lines(entry, width));
            if i + 1 < self.entries.len() {
                lines.push(Line::from(""));
            }
        }

        if lines.is_empty() {
            lines.push(Line::from(Span::styled(
                "Type a message below to start the conversation.",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::DIM),
            )));
        }

        lines
    }
}

fn entry_lines(entry: &ConversationEntry, width: u16) -> Vec<Line<'static>> {
    let (label, label_style) = match entry.direction {
        Direction::Outgoing => (
            "You",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Direction::Incoming => (
            "Bot",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
    };

    let body_style = match entry.status {
        EntryStatus::Errored => Style::default().fg(Color::Red),
        EntryStatus::Pending => Style::default().add_modifier(Modifier::DIM),
        _ => Style::default(),
    };

    let wrap_width = (width as usize).saturating_sub(PREFIX_WIDTH).max(1);
    let mut body: Vec<String> = Vec::new();
    for segment in entry.text.split('\n') {
        if segment.is_empty() {
            body.push(String::new());
            continue;
        }
        for piece in textwrap::wrap(segment, wrap_width) {
            body.push(piece.into_owned());
        }
    }
    if body.is_empty() {
        body.push(String::new());
    }

    let mut lines = Vec::with_capacity(body.len());
    for (i, piece) in body.into_iter().enumerate() {
        if i == 0 {
            lines.push(Line::from(vec![
                Span::styled(label.to_string(), label_style),
                Span::raw(": "),
                Span::styled(piece, body_style),
            ]));
        } else {
            lines.push(Line::from(vec![
                Span::raw(" ".repeat(PREFIX_WIDTH)),
                Span::styled(piece, body_style),
            ]));
        }
    }
    lines
}

impl Widget for ChatWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = self.build_lines(area.width);
        Paragraph::new(Text::from(lines))
            .alignment(Alignment::Left)
            .scroll((self.scroll_top.min(u16::MAX as usize) as u16, 0))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::RETRY_TEXT;

    fn entries() -> Vec<ConversationEntry> {
        vec![
            ConversationEntry::outgoing("hello"),
            ConversationEntry {
                text: RETRY_TEXT.to_string(),
                direction: Direction::Incoming,
                status: EntryStatus::Errored,
            },
        ]
    }

    #[test]
    fn one_line_per_entry_plus_spacer() {
        let entries = entries();
        let lines = ChatWidget::new(&entries).build_lines(80);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].spans[0].content, "You");
        assert_eq!(lines[2].spans[0].content, "Bot");
    }

    #[test]
    fn errored_entry_is_flagged_in_red() {
        let entries = entries();
        let lines = ChatWidget::new(&entries).build_lines(80);
        let body = &lines[2].spans[2];
        assert_eq!(body.content, RETRY_TEXT);
        assert_eq!(body.style.fg, Some(Color::Red));
    }

    #[test]
    fn long_entries_wrap_with_indent() {
        let entries = vec![ConversationEntry::outgoing(
            "a somewhat longer message that will not fit on a single narrow line",
        )];
        let lines = ChatWidget::new(&entries).build_lines(24);
        assert!(lines.len() > 1);
        assert_eq!(lines[1].spans[0].content, " ".repeat(PREFIX_WIDTH));
    }

    #[test]
    fn empty_list_shows_the_welcome_line() {
        let lines = ChatWidget::new(&[]).build_lines(80);
        assert_eq!(lines.len(), 1);
    }
}
