use chatbox_chatgpt::ClientError;
use tokio::sync::mpsc::UnboundedSender;

/// Events produced by background tasks and consumed by the UI loop.
#[derive(Debug)]
pub enum AppEvent {
    /// The fixed post-submit delay elapsed; append the waiting placeholder and
    /// start the network call for `text`.
    PlaceholderDue { request_id: u64, text: String },
    /// The network call settled, one way or the other.
    CompletionResult {
        request_id: u64,
        result: Result<String, ClientError>,
    },
}

#[derive(Clone)]
pub struct AppEventSender(UnboundedSender<AppEvent>);

impl AppEventSender {
    pub fn new(tx: UnboundedSender<AppEvent>) -> Self {
        Self(tx)
    }

    /// Send is best-effort: the receiver only disappears on shutdown.
    pub fn send(&self, event: AppEvent) {
        let _ = self.0.send(event);
    }
}
