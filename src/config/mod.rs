//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → EdgeConfig (validated, immutable)
//!     → reduced to a RuntimeConfig snapshot, shared via ArcSwap
//!
//! On reload signal:
//!     watcher.rs detects change (or SIGHUP arrives)
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of the RuntimeConfig snapshot
//!     → in-flight requests keep the snapshot they started with
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Bind address and connection ceiling are fixed at startup; a reload
//!   that changes them logs a warning and keeps the old values

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::EdgeConfig;
pub use schema::ListenerConfig;
pub use schema::UpstreamConfig;
