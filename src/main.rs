//! club-edge: the public edge of the club events site.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                  CLUB EDGE                   │
//!                    │                                              │
//!   Browser ─────────┼─▶ net (listener, ─▶ http (host gate,        │
//!                    │    connection cap)    dispatch)              │
//!                    │                        │                     │
//!                    │        ┌───────────────┼───────────────┐     │
//!                    │        ▼               ▼               ▼     │
//!                    │   connection        statics          proxy   │
//!                    │   dropped          (from disk)    (app over  │
//!                    │   (host mismatch)                  socket)   │
//!                    │                                              │
//!                    │  config (TOML + reload)   observability      │
//!                    │  lifecycle (signals)      (logs, metrics)    │
//!                    └──────────────────────────────────────────────┘
//! ```
//!
//! The application itself ships as a second binary (`event-app`) and is
//! reached only through the socket the proxy dials.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;

use club_edge::config::watcher::ConfigWatcher;
use club_edge::config::{load_config, EdgeConfig};
use club_edge::http::{EdgeServer, EdgeState};
use club_edge::lifecycle::{signals, Shutdown};
use club_edge::net::Listener;
use club_edge::observability;

#[derive(Parser, Debug)]
#[command(name = "club-edge", version, about = "Edge server for the club events site")]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply without one.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind address from the configuration.
    #[arg(long)]
    bind: Option<String>,

    /// Load and validate the configuration, print it, and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EdgeConfig::default(),
    };
    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
    }

    if cli.check {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    observability::init_tracing(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "club-edge starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        server_name = %config.server.server_name,
        upstream_socket = %config.upstream.socket_path,
        static_root = %config.static_files.root,
        max_body_bytes = config.limits.max_body_bytes,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => observability::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = Listener::bind(&config.listener).await?;

    let server = EdgeServer::new(&config);
    let state = server.state();

    // The notify handle must outlive main or watching stops.
    let _watcher = match &cli.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            let handle = watcher.run()?;
            spawn_reload_task(
                Arc::clone(&state),
                path.clone(),
                updates,
                signals::spawn_reload_listener(),
            );
            Some(handle)
        }
        None => None,
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Apply configuration updates from the file watcher and from SIGHUP.
fn spawn_reload_task(
    state: Arc<EdgeState>,
    path: PathBuf,
    mut updates: mpsc::UnboundedReceiver<EdgeConfig>,
    mut hangups: mpsc::UnboundedReceiver<()>,
) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                next = updates.recv() => match next {
                    Some(config) => state.apply(&config),
                    None => break,
                },
                next = hangups.recv() => match next {
                    Some(()) => match load_config(&path) {
                        Ok(config) => state.apply(&config),
                        Err(e) => tracing::error!(
                            "Failed to reload config: {}. Keeping current configuration.",
                            e
                        ),
                    },
                    None => break,
                },
            }
        }
    });
}
