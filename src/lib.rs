//! Edge server and application for the club events site.

pub mod app;
pub mod config;
pub mod forms;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod pages;
pub mod proxy;

pub use config::{load_config, EdgeConfig};
pub use http::{EdgeServer, EdgeState};
pub use lifecycle::Shutdown;
