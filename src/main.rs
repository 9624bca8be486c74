//! Jobboard: read-only HTTP API over a job posting document store

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jobboard::{
    api::ProductService,
    config::{Config, LogFormat, LoggingConfig},
    http::HttpServer,
    stats::PlottersRenderer,
    store::create_store,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jobboard")]
#[command(about = "Read-only HTTP API over a job posting document store")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Listen address
        #[arg(short, long)]
        listen: Option<String>,

        /// Document store connection string
        #[arg(long)]
        store_uri: Option<String>,
    },

    /// Write a default configuration file
    Init {
        /// Output directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Render the statistics chart once and write it as PNG
    Chart {
        /// Output PNG path
        #[arg(short, long, default_value = "stats.png")]
        output: PathBuf,
    },
}

fn init_logging(config: &LoggingConfig, verbose: u8) -> Result<()> {
    let level = config.level.raised_by(verbose);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let result = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_default(&cli.config)?;
    init_logging(&config.logging, cli.verbose)?;

    match cli.command {
        Commands::Serve { listen, store_uri } => serve(config, listen, store_uri).await,
        Commands::Init { path } => init_config(path),
        Commands::Chart { output } => render_chart(config, output).await,
    }
}

async fn build_service(config: &Config) -> Result<Arc<ProductService>> {
    let store = create_store(&config.store)
        .await
        .context("Failed to create document store")?;
    let renderer = Arc::new(PlottersRenderer::new(&config.chart));
    Ok(Arc::new(ProductService::from_config(config, store, renderer)))
}

async fn serve(mut config: Config, listen: Option<String>, store_uri: Option<String>) -> Result<()> {
    if let Some(addr) = listen {
        config.http.listen_addr = addr;
    }
    if let Some(uri) = store_uri {
        config.store.uri = uri;
    }
    config.validate()?;

    info!("Starting jobboard (store backend: {})", config.store.backend);
    let service = build_service(&config).await?;

    let health = service.health().await;
    if !health.healthy {
        warn!("Document store is not reachable yet; requests will fail until it is");
    }

    HttpServer::new(config.http.clone(), service)
        .run_until(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = wait_for_sigterm() => {
            info!("Received SIGTERM, shutting down");
        }
    }
}

#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!("Failed to register SIGTERM handler: {}. Falling back to pending future.", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await
}

fn init_config(path: PathBuf) -> Result<()> {
    std::fs::create_dir_all(&path)?;
    let config_path = path.join("config.toml");
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    std::fs::write(&config_path, Config::default().to_toml()?)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Wrote {}", config_path.display());
    Ok(())
}

async fn render_chart(config: Config, output: PathBuf) -> Result<()> {
    config.validate()?;
    let service = build_service(&config).await?;
    let png = service.stats_png().await?;
    std::fs::write(&output, &png).with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Wrote {} ({} bytes)", output.display(), png.len());
    Ok(())
}
