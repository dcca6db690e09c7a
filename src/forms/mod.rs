//! Server-side forms.
//!
//! # Data Flow
//! ```text
//! POST body (urlencoded)
//!     → EventFormData (raw, every key optional)
//!     → EventForm::bind (fields carry the submitted values)
//!     → EventForm::validate (field checks, then cross-field checks)
//!     → Ok: an Event to store | Err: the same form, now carrying messages
//! ```
//!
//! # Design Decisions
//! - Fields echo raw input back verbatim; only validated values are trimmed
//! - Field errors attach to their field, cross-field errors to the form
//! - Error strings are complete sentences, written for the visitor

pub mod event;
pub mod field;

pub use event::{slugify, Event, EventForm, EventFormData};
pub use field::{BoundField, Widget};
