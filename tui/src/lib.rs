pub mod app;
pub mod app_event;
pub mod composer;
pub mod conversation;
pub mod textarea;
pub mod widgets;

use anyhow::Result;
use chatbox_common::Config;

pub use app::App;
pub use composer::{Composer, InputResult};
pub use conversation::Conversation;

/// Run the chat widget until the user quits.
pub async fn run_interactive(config: Config) -> Result<()> {
    let mut app = App::new(config);
    app.run().await
}
