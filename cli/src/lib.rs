use anyhow::Result;
use clap::Parser;
use chatbox_common::Config;

#[derive(Parser)]
#[command(name = "chatbox")]
#[command(about = "Minimal terminal chat widget backed by a completion endpoint")]
pub struct Cli {
    /// Write tracing output to stderr (RUST_LOG controls the filter)
    #[arg(long)]
    pub debug: bool,

    /// Override the model (e.g. gpt-4o-mini)
    #[arg(long)]
    pub model: Option<String>,
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        // Off by default so nothing bleeds into the alternate screen.
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let mut config = Config::from_env();
    if let Some(model) = cli.model {
        config.model = model;
    }

    chatbox_tui::run_interactive(config).await
}
