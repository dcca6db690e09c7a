//! The application upstream behind the edge.
//!
//! There is exactly one upstream: the application process listening on a
//! Unix domain socket. Failures are counted for logs and metrics but never
//! take the socket out of service; every request dials it again, so the
//! moment the application comes back the very next request succeeds.

use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::body::Body;
use axum::http::{Request, Response, Uri};
use hyper::body::Incoming;
use hyper_util::client::legacy::connect::{Connected, Connection};
use hyper_util::client::legacy::Client;
use hyper_util::rt::{TokioExecutor, TokioIo};
use thiserror::Error;
use tokio::net::UnixStream;

/// Errors from one forwarding attempt.
#[derive(Debug, Error)]
pub enum SendError {
    /// The socket could not be dialed (application down or starting up).
    #[error("could not reach the application socket: {0}")]
    Connect(hyper_util::client::legacy::Error),

    /// The connection worked but the exchange failed partway.
    #[error("upstream exchange failed: {0}")]
    Exchange(hyper_util::client::legacy::Error),

    /// No response head arrived within the configured window.
    #[error("upstream did not respond within {0:?}")]
    ResponseTimeout(Duration),
}

/// Settings the connector and request path read per call. Swapped
/// atomically on reload.
#[derive(Debug)]
struct UpstreamSettings {
    socket_path: PathBuf,
    connect_timeout: Duration,
    response_timeout: Duration,
}

impl From<&crate::config::UpstreamConfig> for UpstreamSettings {
    fn from(config: &crate::config::UpstreamConfig) -> Self {
        Self {
            socket_path: PathBuf::from(&config.socket_path),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            response_timeout: Duration::from_secs(config.response_timeout_secs),
        }
    }
}

/// The single application backend.
pub struct Upstream {
    client: Client<UnixConnector, Body>,
    settings: Arc<ArcSwap<UpstreamSettings>>,
    consecutive_failures: AtomicUsize,
    total_failures: AtomicU64,
}

impl Upstream {
    /// Build the upstream client for the configured socket.
    pub fn new(config: &crate::config::UpstreamConfig) -> Self {
        let settings = Arc::new(ArcSwap::from_pointee(UpstreamSettings::from(config)));
        let connector = UnixConnector {
            settings: Arc::clone(&settings),
        };

        // One fresh connection per request, like the classic proxy setup
        // this replaces. Nothing lingers in a pool pointing at a socket
        // the application may have re-created.
        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build(connector);

        Self {
            client,
            settings,
            consecutive_failures: AtomicUsize::new(0),
            total_failures: AtomicU64::new(0),
        }
    }

    /// Apply reloaded settings. In-flight requests keep the old ones.
    pub fn update(&self, config: &crate::config::UpstreamConfig) {
        let next = UpstreamSettings::from(config);
        let previous = self.settings.load();
        if previous.socket_path != next.socket_path {
            tracing::info!(
                old = %previous.socket_path.display(),
                new = %next.socket_path.display(),
                "Upstream socket path changed"
            );
        }
        self.settings.store(Arc::new(next));
    }

    /// The socket path requests currently dial.
    pub fn socket_path(&self) -> PathBuf {
        self.settings.load().socket_path.clone()
    }

    /// Forward one request and wait for the response head.
    ///
    /// Every call dials the socket regardless of how the previous call
    /// ended. Counters feed logs and metrics only.
    pub async fn send(&self, req: Request<Body>) -> Result<Response<Incoming>, SendError> {
        let settings = self.settings.load_full();

        match tokio::time::timeout(settings.response_timeout, self.client.request(req)).await {
            Ok(Ok(response)) => {
                self.mark_success();
                Ok(response)
            }
            Ok(Err(err)) => {
                self.mark_failure();
                if err.is_connect() {
                    Err(SendError::Connect(err))
                } else {
                    Err(SendError::Exchange(err))
                }
            }
            Err(_) => {
                self.mark_failure();
                Err(SendError::ResponseTimeout(settings.response_timeout))
            }
        }
    }

    /// Failures since the last success.
    pub fn consecutive_failures(&self) -> usize {
        self.consecutive_failures.load(Ordering::Relaxed)
    }

    /// Failures since startup.
    pub fn total_failures(&self) -> u64 {
        self.total_failures.load(Ordering::Relaxed)
    }

    fn mark_failure(&self) {
        let streak = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
        self.total_failures.fetch_add(1, Ordering::Relaxed);
        crate::observability::metrics::record_upstream_failure();
        tracing::warn!(
            socket = %self.settings.load().socket_path.display(),
            consecutive_failures = streak,
            "Upstream request failed; socket stays in rotation"
        );
    }

    fn mark_success(&self) {
        let streak = self.consecutive_failures.swap(0, Ordering::Relaxed);
        if streak > 0 {
            tracing::info!(
                socket = %self.settings.load().socket_path.display(),
                failures = streak,
                "Upstream recovered"
            );
        }
    }
}

/// Dials the application's Unix socket for the HTTP client.
///
/// The request URI's authority is a placeholder; the connector ignores it
/// and opens whatever socket the current settings name.
#[derive(Clone)]
pub struct UnixConnector {
    settings: Arc<ArcSwap<UpstreamSettings>>,
}

impl tower::Service<Uri> for UnixConnector {
    type Response = UpstreamStream;
    type Error = io::Error;
    type Future = Pin<Box<dyn std::future::Future<Output = io::Result<UpstreamStream>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _dst: Uri) -> Self::Future {
        let settings = self.settings.load_full();
        Box::pin(async move {
            let connect = UnixStream::connect(settings.socket_path.as_path());
            match tokio::time::timeout(settings.connect_timeout, connect).await {
                Ok(Ok(stream)) => Ok(UpstreamStream(TokioIo::new(stream))),
                Ok(Err(err)) => Err(err),
                Err(_) => Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!(
                        "connect to {} timed out after {:?}",
                        settings.socket_path.display(),
                        settings.connect_timeout
                    ),
                )),
            }
        })
    }
}

/// A connected Unix stream in the client's clothing.
pub struct UpstreamStream(TokioIo<UnixStream>);

impl hyper::rt::Read for UpstreamStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: hyper::rt::ReadBufCursor<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().0).poll_read(cx, buf)
    }
}

impl hyper::rt::Write for UpstreamStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().0).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().0).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().0).poll_shutdown(cx)
    }
}

impl Connection for UpstreamStream {
    fn connected(&self) -> Connected {
        Connected::new()
    }
}
