use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use agent007_core::{AgentClient, Config};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "agent007", version)]
#[command(about = "Chat with a tool-chain planning agent from the terminal")]
struct Cli {
    /// Agent endpoint URL (overrides AGENT007_ENDPOINT and the config file)
    #[arg(short, long)]
    endpoint: Option<String>,
    /// Directory for downloaded tool chains
    #[arg(long)]
    export_dir: Option<PathBuf>,
    /// Request timeout in seconds (0 disables it)
    #[arg(long)]
    timeout: Option<u64>,
    /// Write the effective settings to the config file and exit
    #[arg(long)]
    write_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = logging::init().ok();

    let mut config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "could not read config, using defaults");
        Config::new()
    });

    let endpoint = cli.endpoint.unwrap_or_else(|| config.endpoint());
    if let Some(dir) = cli.export_dir {
        config.export_dir = Some(dir);
    }
    if let Some(secs) = cli.timeout {
        config.request_timeout_secs = Some(secs);
    }

    if cli.write_config {
        config.endpoint = Some(endpoint);
        let path = config.save()?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    info!(
        endpoint = %endpoint,
        log = ?log_path,
        timeout = ?config.request_timeout().map(|t: Duration| t.as_secs()),
        "starting agent007"
    );

    let client = AgentClient::new(&endpoint, config.request_timeout())?;
    let mut app = App::new(client, config.export_dir());

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    result
}

async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }

    info!("exiting");
    Ok(())
}
