//! OS signal handling.
//!
//! # Responsibilities
//! - Translate SIGINT/SIGTERM into graceful shutdown
//! - Translate SIGHUP into a configuration reload request

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;

/// Resolve once the process has been asked to stop.
pub async fn shutdown_signal() {
    let mut interrupt = signal(SignalKind::interrupt()).expect("Failed to install SIGINT handler");
    let mut terminate = signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");

    tokio::select! {
        _ = interrupt.recv() => tracing::info!("SIGINT received"),
        _ = terminate.recv() => tracing::info!("SIGTERM received"),
    }
}

/// Forward each SIGHUP as a reload request on the returned channel.
pub fn spawn_reload_listener() -> mpsc::UnboundedReceiver<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(error = %e, "SIGHUP handler unavailable; reload on signal disabled");
                return;
            }
        };
        while hangup.recv().await.is_some() {
            tracing::info!("SIGHUP received, requesting configuration reload");
            if tx.send(()).is_err() {
                break;
            }
        }
    });
    rx
}
