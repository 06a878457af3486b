//! LitContest Server Binary
//!
//! Starts the contest server.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use litcontest::{build_router, Config, ContestEngine, Server, SystemClock};
use tracing_subscriber::{fmt, EnvFilter};

/// LitContest Server
#[derive(Parser, Debug)]
#[command(name = "litcontest-server")]
#[command(about = "Peer-reviewed writing contest server")]
#[command(version)]
struct Args {
    /// TOML config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Listen address (host:port)
    #[arg(short, long)]
    listen: Option<String>,

    /// Worker threads
    #[arg(short, long)]
    workers: Option<usize>,

    /// Pending connections allowed before answering 503
    #[arg(short, long)]
    queue: Option<usize>,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,litcontest=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    tracing::info!("LitContest Server v{}", litcontest::VERSION);
    tracing::info!("Data directory: {}", config.data_dir.display());
    tracing::info!("Listen address: {}", config.listen_addr);
    tracing::info!(
        "Submissions {} .. {}, reviews {} .. {}, results at {}",
        config.contest.submit_from,
        config.contest.submit_to,
        config.contest.review_from,
        config.contest.review_to,
        config.contest.results_at
    );

    let engine = match ContestEngine::open(config.clone(), Arc::new(SystemClock)) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Engine initialized successfully");

    let server = match Server::bind(&config, build_router(engine)) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.listen_addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}

/// File values (or defaults), then flag overrides
fn load_config(args: &Args) -> litcontest::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_toml_file(path)?,
        None => Config::default(),
    };

    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(listen) = &args.listen {
        config.listen_addr = listen.clone();
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(queue) = args.queue {
        config.queue_capacity = queue;
    }

    config.validate()?;
    Ok(config)
}
