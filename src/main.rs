use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ospap::config::Config;
use ospap::metrics;
use ospap::octoprint::{ClientConfig, OctoPrintClient, PrinterApi};
use ospap::poller::{run_cycle, PollCycle, PollScheduler};
use ospap::server::{AppState, ProxyServer};
use ospap::snapshot::SnapshotStore;

#[derive(Parser)]
#[command(
    name = "ospap",
    version,
    about = "Safe publicly-accessible status proxy for OctoPrint",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: ospap.toml or ospap.json next to the binary, in ., or in $HOME)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the config file
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll printers and serve the snapshot API (default)
    Serve,

    /// Run a single poll cycle and print the snapshot
    Poll,

    /// Load and validate the configuration, then exit
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("Couldn't read config")?;

    let log_format = cli.log_format.as_deref().unwrap_or(&config.logging.format);
    setup_tracing(log_format, &config.logging.level, cli.verbose)?;

    if let Some(source) = &config.source {
        tracing::info!("Using config file: {}", source.display());
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await?,
        Commands::Poll => poll(config).await?,
        Commands::CheckConfig => check_config(&config),
    }

    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => tracing_subscriber::EnvFilter::try_new(filter)?,
        Err(_) if verbose => tracing_subscriber::EnvFilter::new("ospap=debug,info"),
        Err(_) => tracing_subscriber::EnvFilter::try_new(format!("ospap={level},warn"))
            .context("Invalid log level")?,
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

fn build_client(config: &Config) -> Result<Arc<dyn PrinterApi>> {
    let client = OctoPrintClient::new(ClientConfig::from(config))
        .context("Failed to create HTTP client")?;
    Ok(Arc::new(client))
}

async fn serve(config: Config) -> Result<()> {
    if let Err(e) = metrics::init_metrics() {
        tracing::warn!("Metrics initialization failed: {}", e);
    }

    if config.printers.is_empty() {
        tracing::warn!("No printers configured; the API will serve an empty list");
    }

    let config = Arc::new(config);
    let store = SnapshotStore::new();
    let cycle = PollCycle::from_config(build_client(&config)?, &config, store.clone());
    let scheduler = PollScheduler::new(cycle, config.polling_interval());

    // Initial poll, so the API never serves an empty snapshot
    scheduler.run_initial_cycle().await;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = scheduler.spawn(shutdown_rx);

    let server = ProxyServer::new(AppState::new(store, Arc::clone(&config)));
    let shutdown = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    };

    server
        .start_with_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    poller.await.context("Poll scheduler task failed")?;
    Ok(())
}

async fn poll(config: Config) -> Result<()> {
    let snapshot = run_cycle(
        build_client(&config)?,
        &config.printers,
        config.connect_delay(),
        1,
    )
    .await;

    tracing::info!(
        printers = snapshot.printers.len(),
        errored = snapshot.errored_count(),
        duration_ms = snapshot.duration_ms,
        "Poll complete"
    );

    let json = serde_json::to_string_pretty(&snapshot.printers)?;
    println!("{json}");
    Ok(())
}

fn check_config(config: &Config) {
    println!("Configuration OK");
    println!("  Server address: {}", config.server_address);
    println!("  Polling interval: {}s", config.polling_interval);
    println!("  Request timeout: {}s", config.request_timeout_secs);
    println!("  Printers: {}", config.printers.len());
    for printer in &config.printers {
        println!(
            "    - {} ({}){}{}",
            printer.name,
            printer.server_address,
            if printer.api_key().is_some() { ", api key" } else { "" },
            if printer.auto_connect { ", auto-connect" } else { "" },
        );
    }
}
