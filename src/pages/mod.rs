//! Server-rendered pages.
//!
//! Markup is built by hand into pre-sized strings; every interpolated
//! value goes through [`html::escape`]. The form page is the contract the
//! forms module renders against: labels tied to inputs by id, field errors
//! in invalid-feedback blocks, form-wide errors as alerts.

pub mod error_page;
pub mod event_create;
pub mod event_index;
pub mod html;

pub use error_page::error_page;
pub use event_create::event_create_page;
pub use event_index::event_index_page;
