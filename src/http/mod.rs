//! HTTP serving: the edge server, the host gate, and static files.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (HTTP/1.1 connection driving, dispatch)
//!     → vhost.rs (does the request address this site at all?)
//!     → statics.rs (answer the static prefix from disk)
//!     → crate::proxy (everything else leaves over the app socket)
//! ```

pub mod server;
pub mod statics;
pub mod vhost;

pub use server::{EdgeError, EdgeServer, EdgeState, RuntimeConfig};
