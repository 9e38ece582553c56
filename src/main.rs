use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    chatbox_cli::run_cli().await
}
