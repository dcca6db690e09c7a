//! Request and response rewriting for the hop to the application.
//!
//! The application trusts the edge to tell it who the client was and what
//! name the site was reached under:
//! - the client's original Host value is carried through unchanged
//! - the client IP is appended to any X-Forwarded-For already present
//! - hop-by-hop headers are stripped in both directions
//! - Location headers from the application pass through untouched, so the
//!   application controls its own redirects

use std::net::IpAddr;

use axum::body::{Body, Bytes};
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request, Uri, Version};
use hyper::body::Body as HttpBody;

/// Placeholder authority for upstream URIs. The connector ignores it and
/// dials the configured socket instead.
pub const UPSTREAM_AUTHORITY: &str = "club-app";

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Headers that describe one TCP hop, not the request itself.
const HOP_BY_HOP_HEADERS: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP_HEADERS
        .iter()
        .any(|hop| name.as_str().eq_ignore_ascii_case(hop))
}

/// Build the request the application sees from the buffered client request.
pub fn build_upstream_request(
    parts: &axum::http::request::Parts,
    body: Bytes,
    client_ip: IpAddr,
) -> Request<Body> {
    let mut req = Request::new(Body::from(body));
    *req.method_mut() = parts.method.clone();
    *req.uri_mut() = upstream_uri(&parts.uri);
    *req.version_mut() = Version::HTTP_11;

    let headers = req.headers_mut();
    for (name, value) in parts.headers.iter() {
        if is_hop_by_hop(name)
            || name == header::CONTENT_LENGTH
            || name.as_str() == X_FORWARDED_FOR
        {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    // Content-Length is recomputed from the buffered body by the client.

    let forwarded = forwarded_for_value(&parts.headers, client_ip);
    headers.insert(
        HeaderName::from_static(X_FORWARDED_FOR),
        forwarded,
    );

    req
}

/// The X-Forwarded-For value to send: every chain already recorded by
/// earlier proxies, joined across header lines, with the client IP
/// appended at the end.
pub fn forwarded_for_value(headers: &HeaderMap, client_ip: IpAddr) -> HeaderValue {
    let ip = client_ip.to_string();
    let prior: Vec<&str> = headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|chain| !chain.is_empty())
        .collect();

    if prior.is_empty() {
        ip_header_value(&ip)
    } else {
        HeaderValue::from_str(&format!("{}, {}", prior.join(", "), ip))
            .unwrap_or_else(|_| ip_header_value(&ip))
    }
}

fn ip_header_value(ip: &str) -> HeaderValue {
    // Textual IP addresses are always valid header values.
    HeaderValue::from_str(ip).expect("IP address is a valid header value")
}

/// Rewrite the client URI for the upstream client: http scheme, placeholder
/// authority, original path and query.
fn upstream_uri(original: &Uri) -> Uri {
    let mut parts = original.clone().into_parts();
    parts.scheme = Some(Scheme::HTTP);
    parts.authority = Some(Authority::from_static(UPSTREAM_AUTHORITY));
    if parts.path_and_query.is_none() {
        parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    Uri::from_parts(parts).unwrap_or_else(|_| original.clone())
}

/// Relay an upstream response to the client, minus hop-by-hop headers.
///
/// Everything else, Location included, passes through as the application
/// wrote it.
pub fn relay_response<B>(upstream: axum::http::Response<B>) -> axum::http::Response<Body>
where
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<axum::BoxError>,
{
    let (mut parts, body) = upstream.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    axum::http::Response::from_parts(parts, Body::new(body))
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn parts_for(req: Request<Body>) -> axum::http::request::Parts {
        req.into_parts().0
    }

    fn client_ip() -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
    }

    #[test]
    fn fresh_forwarded_for_is_just_the_client_ip() {
        let value = forwarded_for_value(&HeaderMap::new(), client_ip());
        assert_eq!(value.to_str().unwrap(), "127.0.0.1");
    }

    #[test]
    fn existing_forwarded_for_chain_is_extended() {
        let mut headers = HeaderMap::new();
        headers.insert(
            X_FORWARDED_FOR,
            HeaderValue::from_static("203.0.113.7, 198.51.100.2"),
        );
        let value = forwarded_for_value(&headers, client_ip());
        assert_eq!(value.to_str().unwrap(), "203.0.113.7, 198.51.100.2, 127.0.0.1");
    }

    #[test]
    fn repeated_forwarded_for_lines_are_joined_before_appending() {
        let req = Request::builder()
            .uri("/events/")
            .header(X_FORWARDED_FOR, "203.0.113.7")
            .header(X_FORWARDED_FOR, "198.51.100.2")
            .body(Body::empty())
            .unwrap();

        let out = build_upstream_request(&parts_for(req), Bytes::new(), client_ip());

        assert_eq!(
            out.headers()[X_FORWARDED_FOR],
            "203.0.113.7, 198.51.100.2, 127.0.0.1"
        );
        assert_eq!(out.headers().get_all(X_FORWARDED_FOR).iter().count(), 1);
    }

    #[test]
    fn host_and_cookies_survive_but_hop_by_hop_does_not() {
        let req = Request::builder()
            .uri("/events/create?draft=1")
            .header(header::HOST, "club.example.org")
            .header(header::COOKIE, "sessionid=abc")
            .header(header::CONNECTION, "keep-alive")
            .header("keep-alive", "timeout=5")
            .header(header::TRANSFER_ENCODING, "chunked")
            .body(Body::empty())
            .unwrap();

        let out = build_upstream_request(&parts_for(req), Bytes::new(), client_ip());

        assert_eq!(out.headers()[header::HOST], "club.example.org");
        assert_eq!(out.headers()[header::COOKIE], "sessionid=abc");
        assert!(out.headers().get(header::CONNECTION).is_none());
        assert!(out.headers().get("keep-alive").is_none());
        assert!(out.headers().get(header::TRANSFER_ENCODING).is_none());
        assert_eq!(out.headers()[X_FORWARDED_FOR], "127.0.0.1");
    }

    #[test]
    fn uri_swaps_authority_and_keeps_path_and_query() {
        let req = Request::builder()
            .uri("/events/create?draft=1")
            .body(Body::empty())
            .unwrap();
        let out = build_upstream_request(&parts_for(req), Bytes::new(), client_ip());

        assert_eq!(out.uri().scheme_str(), Some("http"));
        assert_eq!(out.uri().authority().map(|a| a.as_str()), Some(UPSTREAM_AUTHORITY));
        assert_eq!(out.uri().path_and_query().map(|pq| pq.as_str()), Some("/events/create?draft=1"));
    }

    #[test]
    fn response_location_passes_through_untouched() {
        let upstream = axum::http::Response::builder()
            .status(302)
            .header(header::LOCATION, "http://club-app/events/")
            .header(header::CONNECTION, "close")
            .body(Body::empty())
            .unwrap();

        let out = relay_response(upstream);
        assert_eq!(out.headers()[header::LOCATION], "http://club-app/events/");
        assert!(out.headers().get(header::CONNECTION).is_none());
    }
}
