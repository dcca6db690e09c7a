//! Process lifecycle: signals, shutdown, reload.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     SIGINT/SIGTERM → trigger() → stop accepting → drain → exit
//!
//! Reload (signals.rs + config::watcher):
//!     SIGHUP or file change → reload config → swap runtime snapshot
//! ```
//!
//! # Design Decisions
//! - Shutdown is broadcast so the accept loop and every live connection
//!   react at the same moment
//! - Draining has a deadline; stuck connections do not block exit

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
