//! Upstream forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! Buffered client request
//!     → forward.rs (URI rewrite, Host carry, X-Forwarded-For append,
//!       hop-by-hop strip)
//!     → upstream.rs (dial the Unix socket, timeouts, failure counters)
//!     → response relayed back (hop-by-hop strip, Location untouched)
//! ```
//!
//! # Design Decisions
//! - One upstream, dialed fresh per request; failures never bench it
//! - Connect and response-head timeouts are separate knobs
//! - Redirects are the application's business; the edge never rewrites them

pub mod forward;
pub mod upstream;

pub use upstream::{SendError, UnixConnector, Upstream};
