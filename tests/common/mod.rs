//! Shared utilities for edge integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UnixListener, UnixStream};
use tokio::sync::Mutex;

use club_edge::http::EdgeServer;
use club_edge::net::Listener;
use club_edge::{EdgeConfig, Shutdown};

/// The hostname the test edge answers for.
pub const SITE_HOST: &str = "club.test";

pub const OK_RESPONSE: &str = "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok";

pub const REDIRECT_RESPONSE: &str =
    "HTTP/1.1 302 Found\r\nLocation: http://club-app/events/\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";

/// A scripted application bound to a Unix socket.
///
/// Every request gets the same canned response; the harness remembers
/// how many requests arrived and the raw head of the last one.
pub struct ScriptedUpstream {
    pub hits: Arc<AtomicUsize>,
    pub last_head: Arc<Mutex<String>>,
}

pub fn scripted_upstream(socket_path: &Path, response: &'static str) -> ScriptedUpstream {
    scripted_upstream_with_delay(socket_path, response, Duration::ZERO)
}

/// Like `scripted_upstream`, but sits on each request for `delay`
/// before answering.
pub fn scripted_upstream_with_delay(
    socket_path: &Path,
    response: &'static str,
    delay: Duration,
) -> ScriptedUpstream {
    let listener = UnixListener::bind(socket_path).unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let last_head = Arc::new(Mutex::new(String::new()));

    let upstream = ScriptedUpstream {
        hits: Arc::clone(&hits),
        last_head: Arc::clone(&last_head),
    };

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let hits = Arc::clone(&hits);
                    let last_head = Arc::clone(&last_head);
                    tokio::spawn(async move {
                        handle_scripted(socket, response, delay, hits, last_head).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    upstream
}

async fn handle_scripted(
    mut socket: UnixStream,
    response: &'static str,
    delay: Duration,
    hits: Arc<AtomicUsize>,
    last_head: Arc<Mutex<String>>,
) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    // Read the full request so the proxy never sees a reset while it is
    // still writing the body.
    loop {
        if let Some(head_len) = head_length(&buf) {
            if buf.len() >= head_len + declared_length(&buf[..head_len]) {
                break;
            }
        }
        match socket.read(&mut chunk).await {
            Ok(0) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(_) => return,
        }
    }

    let head_len = head_length(&buf).unwrap();
    *last_head.lock().await = String::from_utf8_lossy(&buf[..head_len]).to_string();
    hits.fetch_add(1, Ordering::SeqCst);

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

fn head_length(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|i| i + 4)
}

fn declared_length(head: &[u8]) -> usize {
    String::from_utf8_lossy(head)
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse().ok()
            } else {
                None
            }
        })
        .unwrap_or(0)
}

/// Edge configuration pointing at the given socket and static root.
pub fn edge_config(socket_path: &Path, static_root: &Path) -> EdgeConfig {
    let mut config = EdgeConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.server.server_name = SITE_HOST.to_string();
    config.upstream.socket_path = socket_path.display().to_string();
    config.upstream.connect_timeout_secs = 2;
    config.static_files.root = static_root.display().to_string();
    config.limits.max_body_bytes = 64 * 1024;
    config
}

/// Start the edge on an ephemeral port.
///
/// The returned `Shutdown` must be held for the test's duration;
/// dropping it stops the server.
pub async fn spawn_edge(config: EdgeConfig) -> (SocketAddr, Shutdown) {
    let listener = Listener::bind(&config.listener).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = EdgeServer::new(&config);
    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, receiver).await;
    });

    (addr, shutdown)
}

/// A client that resolves the site hostname to the edge's address, with
/// redirect following disabled so Location headers can be inspected.
pub fn site_client(addr: SocketAddr) -> reqwest::Client {
    reqwest::Client::builder()
        .resolve(SITE_HOST, addr)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

pub fn site_url(addr: SocketAddr, path: &str) -> String {
    format!("http://{}:{}{}", SITE_HOST, addr.port(), path)
}

/// Read one full response (head plus Content-Length body) off a raw
/// connection, leaving the connection open for the next exchange.
pub async fn read_one_response(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        if let Some(head_len) = head_length(&buf) {
            if buf.len() >= head_len + declared_length(&buf[..head_len]) {
                break;
            }
        }
        match stream.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(_) => break,
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

pub async fn send_raw(stream: &mut TcpStream, bytes: &[u8]) {
    stream.write_all(bytes).await.unwrap();
    stream.flush().await.unwrap();
}
