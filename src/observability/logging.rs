//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber exactly once per process
//! - Let `RUST_LOG` override the configured level
//!
//! # Design Decisions
//! - tracing + EnvFilter + fmt layer; no custom log plumbing
//! - Both binaries share this init so their output lines up

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// The configured level applies to both binaries and the HTTP middleware;
/// a `RUST_LOG` environment variable takes precedence wholesale.
pub fn init_tracing(level: &str) {
    let fallback = format!("club_edge={level},event_app={level},tower_http=warn");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&fallback)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
