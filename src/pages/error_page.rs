//! Minimal error pages in the classic gateway style.

use axum::http::StatusCode;

/// The terse page sent for edge-generated errors (413, 502, 504, static
/// misses). Deliberately unstyled; the application renders its own error
/// pages for everything it handles itself.
pub fn error_page(status: StatusCode) -> String {
    let code = status.as_u16();
    let reason = status.canonical_reason().unwrap_or("Error");
    format!(
        "<html>\n<head><title>{code} {reason}</title></head>\n<body>\n\
         <center><h1>{code} {reason}</h1></center>\n\
         <hr><center>club-edge</center>\n</body>\n</html>\n"
    )
}
