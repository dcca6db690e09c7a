//! Virtual-host gate.
//!
//! The edge answers for exactly one server name. Everything else (scanner
//! traffic hitting the bare IP, stale DNS, random Host headers) is treated
//! as unmatched and the connection is dropped without a response byte.

use axum::http::{header, Request};

/// Decides whether a request's Host belongs to this site.
///
/// Comparison is case-insensitive and ignores any `:port` suffix on either
/// side, so `Club.Example.ORG:8000` matches a configured
/// `club.example.org`.
#[derive(Debug, Clone)]
pub struct HostGate {
    server_name: String,
}

impl HostGate {
    pub fn new(server_name: &str) -> Self {
        Self {
            server_name: strip_port(server_name.trim()).to_ascii_lowercase(),
        }
    }

    /// The normalized name this gate admits.
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Check a raw Host value. `None` (no Host header at all) never matches.
    pub fn permits(&self, host: Option<&str>) -> bool {
        match host {
            Some(raw) => strip_port(raw.trim()).eq_ignore_ascii_case(&self.server_name),
            None => false,
        }
    }
}

/// The Host a request asks for: the Host header when present, otherwise
/// the authority of an absolute-form request target.
pub fn requested_host<B>(req: &Request<B>) -> Option<&str> {
    match req.headers().get(header::HOST) {
        Some(value) => value.to_str().ok(),
        None => req.uri().host(),
    }
}

/// Drop a trailing `:port` from a host value. Bracketed IPv6 literals keep
/// their brackets; a bare IPv6 address is returned unchanged.
fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        }
    } else {
        match host.rsplit_once(':') {
            Some((name, port))
                if !name.contains(':') && port.chars().all(|c| c.is_ascii_digit()) =>
            {
                name
            }
            _ => host,
        }
    }
}
