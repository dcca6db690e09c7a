//! The club events application as a standalone process.
//!
//! Listens on a Unix domain socket only; the edge binary owns the public
//! TCP address and forwards here.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::UnixListener;

use club_edge::app::{self, AppState};
use club_edge::lifecycle::signals;
use club_edge::observability;

#[derive(Parser, Debug)]
#[command(name = "event-app", version, about = "Club events application")]
struct Cli {
    /// Socket path the edge forwards to.
    #[arg(long, default_value = "/tmp/club-app.sock")]
    socket: PathBuf,

    /// Directory the edge serves /static/ from. The app never touches
    /// it; this is logged so a deployment's pieces can be checked in one
    /// place.
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Log level when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    observability::init_tracing(&cli.log_level);

    // A socket file left by a previous run blocks the bind.
    if cli.socket.exists() {
        std::fs::remove_file(&cli.socket)?;
    }
    let listener = UnixListener::bind(&cli.socket)?;
    tracing::info!(socket = %cli.socket.display(), "Event application listening");
    if let Some(dir) = &cli.static_dir {
        tracing::info!(static_dir = %dir.display(), "Static assets are served by the edge");
    }

    let router = app::router(AppState::new());
    axum::serve(listener, router)
        .with_graceful_shutdown(signals::shutdown_signal())
        .await?;

    let _ = std::fs::remove_file(&cli.socket);
    tracing::info!("Shutdown complete");
    Ok(())
}
