//! Atelier TUI
//!
//! # Usage
//!
//! ```bash
//! GEMINI_API_KEY=... atelier-tui texture.jpg silhouette.jpg color.jpg
//!
//! # Keep logs out of the terminal
//! ATELIER_LOG_FILE=/tmp/atelier.log RUST_LOG=debug atelier-tui a.png b.png c.png
//! ```
//!
//! Keys: `r` re-runs (superseding the current run), arrows scroll, `q`/`Esc` quit.

use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use atelier_core::{load_config, load_config_from_path};
use atelier_tui::{App, StudioClient};

#[derive(Parser, Debug)]
#[command(name = "atelier-tui", version, about = "Terminal studio for concept synthesis")]
struct Args {
    /// Texture reference image
    texture: PathBuf,
    /// Silhouette reference image
    silhouette: PathBuf,
    /// Color reference image
    color: PathBuf,
    /// Config file (defaults to ~/.config/atelier/atelier.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Route logs to `ATELIER_LOG_FILE`; without it, logs are discarded
fn init_logging() -> anyhow::Result<()> {
    let Ok(path) = std::env::var("ATELIER_LOG_FILE") else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("atelier_core=info".parse()?)
                .add_directive("atelier_tui=info".parse()?),
        )
        .with_target(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    let args = Args::parse();

    let config = match args.config {
        Some(ref path) => load_config_from_path(Some(path))?,
        None => load_config()?,
    };
    tracing::info!(source = %config.source, "Configuration loaded");

    let client = StudioClient::from_config(&config)?;
    let mut app = App::new(client);
    app.load_references([args.texture, args.silhouette, args.color])
        .await;
    app.start_run().await;

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal).await;
    ratatui::restore();

    result
}
