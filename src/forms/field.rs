//! Form field plumbing.
//!
//! A [`BoundField`] is one field of a form after binding: its definition
//! (label, widget, help text), the raw submitted value, and any validation
//! errors recorded against it. Templates render straight from this; the
//! raw value is echoed back on re-render exactly as the user typed it.

/// The input control a field renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    Text,
    Date,
    Textarea,
}

/// Message recorded when a required field comes back empty.
pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// One field of a bound form.
#[derive(Debug, Clone)]
pub struct BoundField {
    pub name: &'static str,
    pub label: &'static str,
    pub widget: Widget,
    pub value: String,
    pub required: bool,
    pub max_length: Option<usize>,
    pub help_text: Option<&'static str>,
    pub errors: Vec<String>,
}

impl BoundField {
    pub fn new(name: &'static str, label: &'static str, widget: Widget) -> Self {
        Self {
            name,
            label,
            widget,
            value: String::new(),
            required: false,
            max_length: None,
            help_text: None,
            errors: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn max_length(mut self, limit: usize) -> Self {
        self.max_length = Some(limit);
        self
    }

    pub fn help_text(mut self, text: &'static str) -> Self {
        self.help_text = Some(text);
        self
    }

    /// The element id the label points at.
    pub fn id(&self) -> String {
        format!("id_{}", self.name)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// The trimmed value if present, recording the required-field error
    /// otherwise.
    pub fn clean_required(&mut self) -> Option<String> {
        let trimmed = self.value.trim();
        if trimmed.is_empty() {
            if self.required {
                self.add_error(REQUIRED_MESSAGE);
            }
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}
