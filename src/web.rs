#![cfg(not(tarpaulin_include))]

use calltrack::config::ServerArgs;
use calltrack::server;
use clap::Parser;

/// Main entry point for the dashboard server
///
/// Reads the configuration from flags or environment (`BASIC_AUTH_USER`,
/// `BASIC_AUTH_PASS`, `DASHBOARD_ROOT`, `DASHBOARD_DATA`, `DASHBOARD_BIND`),
/// loads the snapshot and serves the dashboard until interrupted.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerArgs::parse().into_config()?;
    log::info!(
        "Serving dashboard from {} with data {}",
        config.root.display(),
        config.data.display()
    );

    server::run(config).await
}
