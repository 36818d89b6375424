mod config;
mod detail;
mod league;
mod query;
mod server;
mod snapshot;
mod utils;

use anyhow::Result;
use clap::Parser;

use crate::config::Settings;

#[derive(Debug, Parser)]
#[command(name = "fixtures-api", version)]
struct Cli {
    /// Override MATCHES_PATH (snapshot JSON document)
    #[arg(long)]
    matches_path: Option<String>,

    /// Override API_PORT
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    if let Some(p) = cli.matches_path {
        settings.matches_path = p;
    }
    if let Some(port) = cli.port {
        settings.api_port = port;
    }
    settings.validate()?;

    log::info!(
        "app.start matches_path={} snapshot_cache={} today_timezone={:?}",
        settings.matches_path,
        settings.snapshot_cache,
        settings.today_timezone
    );

    server::serve(settings).await
}
