//! The edge server.
//!
//! # Responsibilities
//! - Serve accepted connections over HTTP/1.1 with keep-alive
//! - Gate every request on the virtual host; mismatches drop the
//!   connection without writing a response
//! - Answer the static prefix from disk
//! - Enforce the body ceiling before the application sees a byte
//! - Forward everything else to the application socket
//!
//! # Design Decisions
//! - Connections are driven with hyper's HTTP/1 connection API instead of
//!   a framework router: the host-mismatch close cannot be expressed as a
//!   response, so the service returns an error and hyper tears the
//!   connection down unanswered
//! - Dispatch order is fixed: host gate, declared-length precheck,
//!   static prefix, forward. The gate runs first so stray traffic costs
//!   nothing downstream
//! - Each request reads one configuration snapshot; reloads swap the
//!   snapshot atomically and never disturb requests in flight

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, Request, Response, StatusCode};
use http_body_util::{BodyExt, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::broadcast;

use crate::config::{EdgeConfig, ListenerConfig};
use crate::http::statics;
use crate::http::vhost::{requested_host, HostGate};
use crate::net::connection::ConnectionId;
use crate::net::listener::{ConnectionPermit, Listener, ListenerError};
use crate::net::ConnectionTracker;
use crate::observability::metrics;
use crate::pages;
use crate::proxy::{forward, SendError, Upstream};

/// How long shutdown waits for open connections before giving up.
const DRAIN_DEADLINE: Duration = Duration::from_secs(10);

/// The one request outcome that is not a response: the connection is
/// closed with nothing written.
#[derive(Debug, Error)]
pub enum EdgeError {
    /// The request asked for a host this edge does not serve.
    #[error("host {0:?} does not match the configured server name")]
    HostMismatch(Option<String>),
}

/// The slice of configuration each request reads, derived once per load.
#[derive(Debug)]
pub struct RuntimeConfig {
    pub gate: HostGate,
    pub static_prefix: String,
    pub static_root: PathBuf,
    pub max_body_bytes: u64,
    pub keepalive_timeout: Duration,
}

impl From<&EdgeConfig> for RuntimeConfig {
    fn from(config: &EdgeConfig) -> Self {
        Self {
            gate: HostGate::new(&config.server.server_name),
            static_prefix: config.static_files.url_prefix.clone(),
            static_root: PathBuf::from(&config.static_files.root),
            max_body_bytes: config.limits.max_body_bytes,
            keepalive_timeout: Duration::from_secs(config.listener.keepalive_timeout_secs),
        }
    }
}

/// State shared by every connection.
pub struct EdgeState {
    runtime: ArcSwap<RuntimeConfig>,
    upstream: Upstream,
    tracker: ConnectionTracker,
    /// Listener settings as bound at startup; reloads cannot move them.
    startup_listener: ListenerConfig,
}

impl EdgeState {
    pub fn new(config: &EdgeConfig) -> Self {
        Self {
            runtime: ArcSwap::from_pointee(RuntimeConfig::from(config)),
            upstream: Upstream::new(&config.upstream),
            tracker: ConnectionTracker::new(),
            startup_listener: config.listener.clone(),
        }
    }

    /// The snapshot new connections and requests read.
    pub fn runtime(&self) -> Arc<RuntimeConfig> {
        self.runtime.load_full()
    }

    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }

    pub fn upstream(&self) -> &Upstream {
        &self.upstream
    }

    /// Apply a reloaded configuration.
    ///
    /// Everything in the runtime snapshot and the upstream settings takes
    /// effect for subsequent requests. The bind address and connection
    /// ceiling were consumed at startup; changing them needs a restart.
    pub fn apply(&self, config: &EdgeConfig) {
        if config.listener.bind_address != self.startup_listener.bind_address
            || config.listener.max_connections != self.startup_listener.max_connections
        {
            tracing::warn!(
                "bind_address / max_connections changed in config; restart required for those"
            );
        }

        self.upstream.update(&config.upstream);
        self.runtime.store(Arc::new(RuntimeConfig::from(config)));
        tracing::info!(
            server_name = %config.server.server_name,
            static_prefix = %config.static_files.url_prefix,
            max_body_bytes = config.limits.max_body_bytes,
            "Configuration applied"
        );
    }
}

/// The edge HTTP server: an accept loop feeding per-connection tasks.
pub struct EdgeServer {
    state: Arc<EdgeState>,
}

impl EdgeServer {
    pub fn new(config: &EdgeConfig) -> Self {
        Self {
            state: Arc::new(EdgeState::new(config)),
        }
    }

    pub fn state(&self) -> Arc<EdgeState> {
        Arc::clone(&self.state)
    }

    /// Accept connections until `shutdown` fires, then drain.
    pub async fn run(
        &self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ListenerError> {
        let addr = listener.local_addr().map_err(ListenerError::Bind)?;
        tracing::info!(address = %addr, "Edge server starting");

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer, permit)) => {
                            let state = Arc::clone(&self.state);
                            let conn_shutdown = shutdown.resubscribe();
                            tokio::spawn(serve_connection(state, stream, peer, permit, conn_shutdown));
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Accept failed");
                            tokio::time::sleep(Duration::from_millis(50)).await;
                        }
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, draining connections");
                    break;
                }
            }
        }

        // Close the listening socket before draining so late arrivals are
        // refused instead of queued.
        drop(listener);

        if self.state.tracker.wait_for_drain(DRAIN_DEADLINE).await {
            tracing::info!("All connections drained");
        } else {
            tracing::warn!(
                active = self.state.tracker.active_count(),
                "Drain deadline passed with connections still open"
            );
        }
        Ok(())
    }
}

/// Drive one client connection to completion.
async fn serve_connection(
    state: Arc<EdgeState>,
    stream: TcpStream,
    peer: SocketAddr,
    permit: ConnectionPermit,
    mut shutdown: broadcast::Receiver<()>,
) {
    let guard = state.tracker.track();
    let connection_id = guard.id();
    metrics::connection_opened();

    let keepalive = state.runtime().keepalive_timeout;
    let mut builder = http1::Builder::new();
    builder.timer(TokioTimer::new());
    if keepalive.is_zero() {
        builder.keep_alive(false);
    } else {
        builder.keep_alive(true);
        // Also bounds the wait for the first request head, which is the
        // same idle state as between keep-alive requests.
        builder.header_read_timeout(keepalive);
    }

    let service_state = Arc::clone(&state);
    let service = service_fn(move |req: Request<Incoming>| {
        let state = Arc::clone(&service_state);
        async move { handle_request(state, peer, connection_id, req).await }
    });

    let conn = builder.serve_connection(TokioIo::new(stream), service);
    tokio::pin!(conn);

    let mut draining = false;
    loop {
        tokio::select! {
            result = conn.as_mut() => {
                if let Err(err) = result {
                    // Host-mismatch drops surface here; they were already
                    // logged where they were decided.
                    tracing::trace!(
                        connection_id = %connection_id,
                        error = %err,
                        "Connection ended with error"
                    );
                }
                break;
            }
            _ = shutdown.recv(), if !draining => {
                draining = true;
                conn.as_mut().graceful_shutdown();
            }
        }
    }

    metrics::connection_closed();
    drop(guard);
    drop(permit);
}

/// Decide one request: reject, serve from disk, or forward.
async fn handle_request(
    state: Arc<EdgeState>,
    peer: SocketAddr,
    connection_id: ConnectionId,
    mut req: Request<Incoming>,
) -> Result<Response<Body>, EdgeError> {
    let start = Instant::now();
    let runtime = state.runtime();

    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    // Host gate first: anything not addressed to this site is dropped
    // with the connection, response-less.
    let host = requested_host(&req).map(str::to_string);
    if !runtime.gate.permits(host.as_deref()) {
        metrics::record_host_rejection();
        tracing::debug!(
            connection_id = %connection_id,
            peer = %peer,
            host = ?host,
            "Host mismatch; closing connection"
        );
        return Err(EdgeError::HostMismatch(host));
    }

    let request_id = uuid::Uuid::new_v4().to_string();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        req.headers_mut().insert("x-request-id", value);
    }

    tracing::debug!(
        connection_id = %connection_id,
        request_id = %request_id,
        method = %method,
        path = %path,
        "Dispatching request"
    );

    let (mut response, target) = dispatch(&state, &runtime, peer, req).await;
    response
        .headers_mut()
        .insert(header::SERVER, HeaderValue::from_static("club-edge"));

    let status = response.status().as_u16();
    metrics::record_request(&method, status, target, start);
    tracing::info!(
        request_id = %request_id,
        peer = %peer,
        method = %method,
        path = %path,
        status,
        target,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Request served"
    );

    Ok(response)
}

/// Route a gated request to the static tree or the application.
async fn dispatch(
    state: &EdgeState,
    runtime: &RuntimeConfig,
    peer: SocketAddr,
    req: Request<Incoming>,
) -> (Response<Body>, &'static str) {
    // Refuse oversized uploads on the declared length alone; the body is
    // never read.
    if let Some(declared) = declared_content_length(req.headers()) {
        if declared > runtime.max_body_bytes {
            metrics::record_body_rejection();
            return (payload_too_large(), "edge");
        }
    }

    if statics::matches(&runtime.static_prefix, req.uri().path()) {
        let response =
            statics::serve(&runtime.static_root, &runtime.static_prefix, req.map(Body::new)).await;
        return (response, "static");
    }

    let (parts, body) = req.into_parts();
    let body = match read_body_within_limit(body, runtime.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(BodyError::TooLarge) => {
            metrics::record_body_rejection();
            return (payload_too_large(), "edge");
        }
        Err(BodyError::Read(err)) => {
            tracing::debug!(error = %err, "Client body read failed");
            return (plain_response(StatusCode::BAD_REQUEST), "edge");
        }
    };

    let upstream_req = forward::build_upstream_request(&parts, body, peer.ip());
    match state.upstream().send(upstream_req).await {
        Ok(response) => (forward::relay_response(response), "app"),
        Err(err @ SendError::ResponseTimeout(_)) => {
            tracing::error!(error = %err, "Upstream timed out");
            (plain_response(StatusCode::GATEWAY_TIMEOUT), "app")
        }
        Err(err) => {
            tracing::error!(error = %err, "Upstream unreachable");
            (plain_response(StatusCode::BAD_GATEWAY), "app")
        }
    }
}

fn declared_content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

enum BodyError {
    TooLarge,
    Read(Box<dyn std::error::Error + Send + Sync>),
}

/// Buffer the request body, failing as soon as it crosses the ceiling.
/// Catches chunked uploads that carry no Content-Length up front.
async fn read_body_within_limit(body: Incoming, limit: u64) -> Result<Bytes, BodyError> {
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(err) if err.downcast_ref::<http_body_util::LengthLimitError>().is_some() => {
            Err(BodyError::TooLarge)
        }
        Err(err) => Err(BodyError::Read(err)),
    }
}

fn payload_too_large() -> Response<Body> {
    let mut response = plain_response(StatusCode::PAYLOAD_TOO_LARGE);
    // The unread remainder of the upload would desync keep-alive.
    response
        .headers_mut()
        .insert(header::CONNECTION, HeaderValue::from_static("close"));
    response
}

fn plain_response(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::from(pages::error_page(status)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    response
}
