use chatbox_common::{ConversationEntry, EntryStatus};
use std::collections::HashMap;

use chatbox_chatgpt::ClientError;

/// Text shown in an Incoming placeholder until its response arrives.
pub const THINKING_TEXT: &str = "Thinking..";
/// Text shown when the request fails; no automatic retry.
pub const RETRY_TEXT: &str = "Try again";

/// A submission accepted by [`Conversation::submit`]: the trimmed text plus the
/// request id its eventual placeholder and response will be keyed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub request_id: u64,
    pub text: String,
}

/// The conversation list and its scroll state. Entries are append-only and
/// owned here exclusively; each in-flight request resolves into its own entry,
/// so overlapping requests can interleave visually but never corrupt each
/// other.
pub struct Conversation {
    entries: Vec<ConversationEntry>,
    /// request id -> index of the placeholder entry awaiting that response.
    pending: HashMap<u64, usize>,
    next_request_id: u64,
    /// Last submitted user message, overwritten on every send.
    last_message: Option<String>,
    scroll_top: usize,
    follow_bottom: bool,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            pending: HashMap::new(),
            next_request_id: 0,
            last_message: None,
            scroll_top: 0,
            follow_bottom: true,
        }
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    /// Accept one line of user text. Whitespace-only input is a no-op: no
    /// entry, no request. Otherwise appends the Outgoing entry and hands back
    /// the submission to schedule.
    pub fn submit(&mut self, raw: &str) -> Option<Submission> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }

        self.last_message = Some(text.to_string());
        self.entries.push(ConversationEntry::outgoing(text));
        self.scroll_to_bottom();

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        Some(Submission {
            request_id,
            text: text.to_string(),
        })
    }

    /// Append the waiting placeholder for a submitted request.
    pub fn begin_placeholder(&mut self, request_id: u64) {
        self.entries.push(ConversationEntry::placeholder(THINKING_TEXT));
        self.pending.insert(request_id, self.entries.len() - 1);
        self.scroll_to_bottom();
    }

    /// Settle a request into its own placeholder entry. Success replaces the
    /// text with the response; failure replaces it with the fixed retry text
    /// and flags the entry. Either way the view snaps to the end.
    pub fn resolve(&mut self, request_id: u64, result: Result<String, ClientError>) {
        if let Some(index) = self.pending.remove(&request_id) {
            if let Some(entry) = self.entries.get_mut(index) {
                match result {
                    Ok(text) => {
                        entry.text = text;
                        entry.status = EntryStatus::Answered;
                    }
                    Err(_) => {
                        entry.text = RETRY_TEXT.to_string();
                        entry.status = EntryStatus::Errored;
                    }
                }
            }
        }
        self.scroll_to_bottom();
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow_bottom = true;
        self.scroll_top = usize::MAX;
    }

    pub fn scroll_up(&mut self, amount: usize, total_lines: usize, viewport: usize) {
        let top = self.visible_top(total_lines, viewport);
        self.scroll_top = top.saturating_sub(amount);
        self.follow_bottom = false;
    }

    pub fn scroll_down(&mut self, amount: usize, total_lines: usize, viewport: usize) {
        let max_top = Self::max_scroll_top(total_lines, viewport);
        let top = self.visible_top(total_lines, viewport).saturating_add(amount);
        if top >= max_top {
            self.scroll_to_bottom();
        } else {
            self.scroll_top = top;
        }
    }

    pub fn is_following_bottom(&self) -> bool {
        self.follow_bottom
    }

    /// The scroll offset to render at, clamped to the content.
    pub fn visible_top(&self, total_lines: usize, viewport: usize) -> usize {
        let max_top = Self::max_scroll_top(total_lines, viewport);
        if self.follow_bottom {
            max_top
        } else {
            self.scroll_top.min(max_top)
        }
    }

    fn max_scroll_top(total_lines: usize, viewport: usize) -> usize {
        total_lines.saturating_sub(viewport)
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
