//! The club events application.
//!
//! A small site the edge fronts over a local socket: an event list and
//! the creation form. It never talks TCP in production; the edge owns
//! the public address.
//!
//! # Data Flow
//! ```text
//! GET  /events/        → list stored events
//! GET  /events/create  → empty form
//! POST /events/create  → bind + validate → store and redirect,
//!                        or re-render the form with errors
//! ```

pub mod handlers;

use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use handlers::AppState;

/// Largest form body the application itself accepts. The edge enforces
/// its own ceiling first.
const MAX_FORM_BYTES: usize = 64 * 1024;

const HANDLER_TIMEOUT: Duration = Duration::from_secs(30);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/events/", get(handlers::event_index))
        .route(
            "/events/create",
            get(handlers::event_create_form).post(handlers::event_create_submit),
        )
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(HANDLER_TIMEOUT))
        .layer(RequestBodyLimitLayer::new(MAX_FORM_BYTES))
        .with_state(state)
}
