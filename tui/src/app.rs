use anyhow::Result;
use chatbox_chatgpt::{CompletionClient, OpenAiClient};
use chatbox_common::Config;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, WidgetRef},
    Frame, Terminal,
};
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::time::{sleep, Duration};

use crate::app_event::{AppEvent, AppEventSender};
use crate::composer::{Composer, InputResult};
use crate::conversation::Conversation;
use crate::widgets::ChatWidget;

/// Delay between appending the Outgoing entry and showing the waiting
/// placeholder; the request starts once the placeholder exists.
const PLACEHOLDER_DELAY: Duration = Duration::from_millis(600);

const COMPOSER_PLACEHOLDER: &str = "Ask the bot anything";

pub struct App {
    running: bool,
    conversation: Conversation,
    composer: Composer,
    /// Presentation flag only; toggled by Ctrl+T, cleared by Esc.
    panel_visible: bool,
    client: Arc<dyn CompletionClient + Send + Sync>,
    app_event_tx: AppEventSender,
    app_event_rx: UnboundedReceiver<AppEvent>,
    // Captured at draw time for key gating and page scrolling.
    last_width: u16,
    chat_total_lines: usize,
    chat_viewport_height: usize,
}

impl App {
    /// The endpoint is always called, even with a blank bearer token; a
    /// rejected request settles into the retry text like any other failure.
    pub fn new(config: Config) -> Self {
        Self::with_client(Arc::new(OpenAiClient::new(&config)))
    }

    pub fn with_client(client: Arc<dyn CompletionClient + Send + Sync>) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            running: true,
            conversation: Conversation::new(),
            composer: Composer::new(COMPOSER_PLACEHOLDER.to_string()),
            panel_visible: true,
            client,
            app_event_tx: AppEventSender::new(tx),
            app_event_rx: rx,
            last_width: 0,
            chat_total_lines: 0,
            chat_viewport_height: 0,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal).await;

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        while self.running {
            terminal.draw(|f| self.draw(f))?;

            tokio::select! {
                maybe_event = self.app_event_rx.recv() => {
                    if let Some(ev) = maybe_event {
                        self.handle_app_event(ev);
                    }
                }
                poll_result = tokio::task::spawn_blocking(|| {
                    event::poll(std::time::Duration::from_millis(50))
                }) => {
                    if let Ok(Ok(true)) = poll_result {
                        if let Ok(Event::Key(key)) = event::read() {
                            self.handle_key_event(key);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key {
            KeyEvent {
                code: KeyCode::Char('c') | KeyCode::Char('q'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => {
                self.running = false;
            }
            KeyEvent {
                code: KeyCode::Char('t'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => {
                self.panel_visible = !self.panel_visible;
            }
            KeyEvent {
                code: KeyCode::Esc, ..
            } => {
                self.panel_visible = false;
            }
            _ if !self.panel_visible => {}
            KeyEvent {
                code: KeyCode::Char('s'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => {
                // The ungated send control, like clicking the send button.
                if let Some(text) = self.composer.take_submission() {
                    self.start_request(text);
                }
            }
            KeyEvent {
                code: KeyCode::PageUp,
                ..
            } => {
                let page = self.chat_viewport_height.max(1);
                self.conversation
                    .scroll_up(page, self.chat_total_lines, self.chat_viewport_height);
            }
            KeyEvent {
                code: KeyCode::PageDown,
                ..
            } => {
                let page = self.chat_viewport_height.max(1);
                self.conversation
                    .scroll_down(page, self.chat_total_lines, self.chat_viewport_height);
            }
            other => {
                let (result, _) = self.composer.handle_key_event(other, self.last_width);
                if let InputResult::Submitted(text) = result {
                    self.start_request(text);
                }
            }
        }
    }

    /// Append the Outgoing entry and schedule the placeholder after the fixed
    /// delay. The network call itself starts when the placeholder appears.
    fn start_request(&mut self, text: String) {
        let Some(sub) = self.conversation.submit(&text) else {
            return;
        };
        tracing::debug!(request_id = sub.request_id, "user message submitted");

        let tx = self.app_event_tx.clone();
        tokio::spawn(async move {
            sleep(PLACEHOLDER_DELAY).await;
            tx.send(AppEvent::PlaceholderDue {
                request_id: sub.request_id,
                text: sub.text,
            });
        });
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::PlaceholderDue { request_id, text } => {
                self.conversation.begin_placeholder(request_id);

                let client = Arc::clone(&self.client);
                let tx = self.app_event_tx.clone();
                tokio::spawn(async move {
                    let result = client.complete(text).await;
                    tx.send(AppEvent::CompletionResult { request_id, result });
                });
            }
            AppEvent::CompletionResult { request_id, result } => {
                if let Err(err) = &result {
                    tracing::warn!(request_id, error = %err, "completion request failed");
                }
                self.conversation.resolve(request_id, result);
            }
        }
    }

    fn draw(&mut self, f: &mut Frame) {
        let size = f.area();
        self.last_width = size.width;

        if !self.panel_visible {
            let hint = Paragraph::new(Line::from(Span::styled(
                "Chat hidden (Ctrl+T to show, Ctrl+C to quit)",
                Style::default().add_modifier(Modifier::DIM),
            )));
            f.render_widget(hint, size);
            return;
        }

        let composer_height = self
            .composer
            .desired_height(size.width)
            .min(size.height / 2)
            .max(2);
        let [chat_area, composer_area] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(composer_height)])
                .areas(size);

        let total_lines = ChatWidget::new(self.conversation.entries()).build_lines(chat_area.width).len();
        self.chat_total_lines = total_lines;
        self.chat_viewport_height = chat_area.height as usize;
        let top = self
            .conversation
            .visible_top(total_lines, chat_area.height as usize);

        f.render_widget(
            ChatWidget::new(self.conversation.entries()).with_scroll(top),
            chat_area,
        );

        (&self.composer).render_ref(composer_area, f.buffer_mut());
        if let Some((x, y)) = self.composer.cursor_pos(composer_area) {
            f.set_cursor_position((x, y));
        }
    }

    #[cfg(test)]
    fn drain_app_events(&mut self) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Ok(ev) = self.app_event_rx.try_recv() {
            events.push(ev);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::MIN_SUBMIT_WIDTH;
    use crate::conversation::{RETRY_TEXT, THINKING_TEXT};
    use chatbox_chatgpt::{ClientError, StubClient};
    use chatbox_common::{Direction, EntryStatus};
    use ratatui::backend::TestBackend;

    fn test_app() -> App {
        App::with_client(Arc::new(StubClient))
    }

    fn draw_once(app: &mut App, width: u16, height: u16) {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).expect("test terminal");
        terminal.draw(|f| app.draw(f)).expect("draw");
    }

    fn press(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        app.handle_key_event(KeyEvent::new(code, modifiers));
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    #[tokio::test]
    async fn ctrl_s_with_empty_composer_does_nothing() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert!(app.conversation.entries().is_empty());
        assert!(app.drain_app_events().is_empty());
    }

    #[tokio::test]
    async fn shift_enter_submits_only_on_wide_terminals() {
        let mut app = test_app();
        draw_once(&mut app, MIN_SUBMIT_WIDTH - 10, 24);
        type_str(&mut app, "hello");
        press(&mut app, KeyCode::Enter, KeyModifiers::SHIFT);
        assert!(app.conversation.entries().is_empty());

        draw_once(&mut app, MIN_SUBMIT_WIDTH, 24);
        press(&mut app, KeyCode::Enter, KeyModifiers::SHIFT);
        assert_eq!(app.conversation.entries().len(), 1);
        assert_eq!(app.conversation.entries()[0].direction, Direction::Outgoing);
    }

    #[tokio::test]
    async fn full_turn_resolves_placeholder_with_response() {
        let mut app = test_app();
        type_str(&mut app, "hello");
        press(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(app.conversation.entries().len(), 1);
        assert!(app.composer.is_empty());

        // Drive the deferred placeholder and the settled request by hand.
        app.handle_app_event(AppEvent::PlaceholderDue {
            request_id: 0,
            text: "hello".to_string(),
        });
        assert_eq!(app.conversation.entries().len(), 2);
        assert_eq!(app.conversation.entries()[1].text, THINKING_TEXT);

        app.handle_app_event(AppEvent::CompletionResult {
            request_id: 0,
            result: Ok("Hi".to_string()),
        });
        assert_eq!(app.conversation.entries()[1].text, "Hi");
        assert_eq!(app.conversation.entries()[1].status, EntryStatus::Answered);
    }

    #[tokio::test]
    async fn failed_turn_shows_retry_text() {
        let mut app = test_app();
        type_str(&mut app, "hello");
        press(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL);
        app.handle_app_event(AppEvent::PlaceholderDue {
            request_id: 0,
            text: "hello".to_string(),
        });
        app.handle_app_event(AppEvent::CompletionResult {
            request_id: 0,
            result: Err(ClientError::MalformedResponse("no choices".to_string())),
        });
        assert_eq!(app.conversation.entries()[1].text, RETRY_TEXT);
        assert!(app.conversation.entries()[1].is_errored());
    }

    #[tokio::test]
    async fn toggle_and_close_only_touch_the_visibility_flag() {
        let mut app = test_app();
        assert!(app.panel_visible);
        press(&mut app, KeyCode::Char('t'), KeyModifiers::CONTROL);
        assert!(!app.panel_visible);
        press(&mut app, KeyCode::Char('t'), KeyModifiers::CONTROL);
        assert!(app.panel_visible);
        press(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert!(!app.panel_visible);
        assert!(app.conversation.entries().is_empty());

        // Hidden panel swallows composer input.
        type_str(&mut app, "hi");
        assert!(app.composer.is_empty());
    }

    #[tokio::test]
    async fn blank_token_run_still_posts_and_surfaces_retry_text() {
        // Default construction must go through the real client; a request
        // against a closed local port settles as an error, not an echo.
        let config = Config {
            api_key: String::new(),
            endpoint: "http://127.0.0.1:1/v1/chat/completions".to_string(),
            ..Config::default()
        };
        let mut app = App::new(config);
        type_str(&mut app, "hello");
        press(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL);
        app.handle_app_event(AppEvent::PlaceholderDue {
            request_id: 0,
            text: "hello".to_string(),
        });

        let result = loop {
            match app.app_event_rx.recv().await {
                Some(AppEvent::CompletionResult { result, .. }) => break result,
                Some(_) => continue,
                None => panic!("event channel closed"),
            }
        };
        assert!(result.is_err());

        app.handle_app_event(AppEvent::CompletionResult {
            request_id: 0,
            result,
        });
        assert_eq!(app.conversation.entries()[1].text, RETRY_TEXT);
        assert!(app.conversation.entries()[1].is_errored());
    }

    #[tokio::test]
    async fn hidden_panel_still_renders() {
        let mut app = test_app();
        press(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        draw_once(&mut app, 100, 24);
    }
}
