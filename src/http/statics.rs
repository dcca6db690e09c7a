//! Static asset serving.
//!
//! Requests under the configured URL prefix never reach the application
//! process. The prefix is an alias: it is stripped before the remainder is
//! resolved under the static root, so `/static/css/club.css` with root
//! `/srv/club/static` reads `/srv/club/static/css/club.css`.

use std::path::Path;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode, Uri};
use tower::util::ServiceExt;
use tower_http::services::ServeDir;

use crate::pages;

/// Whether a request path falls under the static prefix.
pub fn matches(prefix: &str, path: &str) -> bool {
    path.starts_with(prefix)
}

/// Serve one request from the static root.
///
/// Traversal out of the root is refused by `ServeDir`; misses come back as
/// the plain error page rather than an empty 404.
pub async fn serve(root: &Path, prefix: &str, req: Request<Body>) -> Response<Body> {
    let rest = req.uri().path().strip_prefix(prefix).unwrap_or("");
    let rewritten = format!("/{}", rest);

    let uri: Uri = match rewritten.parse() {
        Ok(uri) => uri,
        Err(_) => return plain_error(StatusCode::BAD_REQUEST),
    };

    let mut req = req;
    *req.uri_mut() = uri;

    let response = match ServeDir::new(root).oneshot(req).await {
        Ok(response) => response,
        Err(infallible) => match infallible {},
    };

    match response.status() {
        StatusCode::NOT_FOUND | StatusCode::INTERNAL_SERVER_ERROR => {
            plain_error(response.status())
        }
        _ => response.map(Body::new),
    }
}

fn plain_error(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::from(pages::error_page(status)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("text/html; charset=utf-8"),
    );
    response
}
