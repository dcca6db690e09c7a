//! The event creation form and the record it produces.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::forms::field::{BoundField, Widget};

const DATE_FORMAT: &str = "%Y-%m-%d";
const INVALID_DATE_MESSAGE: &str = "Enter a valid date.";
const FINISH_BEFORE_START_MESSAGE: &str = "Finish date cannot be before start date.";

/// Raw POST data as the browser submits it. Missing keys bind as `None`.
///
/// The CSRF token travels with the rest of the POST body; the form
/// itself never looks at it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFormData {
    pub csrf_token: Option<String>,
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub finish_date: Option<String>,
    pub owner: Option<String>,
    pub description: Option<String>,
}

/// A validated event ready to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub name: String,
    pub slug: String,
    pub start_date: NaiveDate,
    pub finish_date: NaiveDate,
    pub owner: String,
    pub description: String,
}

/// The event creation form: five bound fields plus form-wide errors.
#[derive(Debug, Clone)]
pub struct EventForm {
    pub name: BoundField,
    pub start_date: BoundField,
    pub finish_date: BoundField,
    pub owner: BoundField,
    pub description: BoundField,
    pub non_field_errors: Vec<String>,
}

impl EventForm {
    /// An unbound form for the initial GET render.
    pub fn empty() -> Self {
        Self {
            name: BoundField::new("name", "Name", Widget::Text)
                .required()
                .max_length(100),
            start_date: BoundField::new("start_date", "Start date", Widget::Date)
                .required()
                .help_text("Format: YYYY-MM-DD."),
            finish_date: BoundField::new("finish_date", "Finish date", Widget::Date)
                .required()
                .help_text("Format: YYYY-MM-DD."),
            owner: BoundField::new("owner", "Owner", Widget::Text)
                .required()
                .help_text("Name of the volunteer running the event."),
            description: BoundField::new("description", "Description", Widget::Textarea),
            non_field_errors: Vec::new(),
        }
    }

    /// Bind submitted data. Raw values are kept verbatim so a re-render
    /// shows exactly what was typed.
    pub fn bind(data: &EventFormData) -> Self {
        let mut form = Self::empty();
        form.name.value = data.name.clone().unwrap_or_default();
        form.start_date.value = data.start_date.clone().unwrap_or_default();
        form.finish_date.value = data.finish_date.clone().unwrap_or_default();
        form.owner.value = data.owner.clone().unwrap_or_default();
        form.description.value = data.description.clone().unwrap_or_default();
        form
    }

    /// Run all field and cross-field checks, recording errors in place.
    ///
    /// Returns the finished event only when every check passed; otherwise
    /// the form carries the messages the page renders back.
    pub fn validate(&mut self) -> Option<Event> {
        let name = self.name.clean_required().and_then(|value| {
            let length = value.chars().count();
            match self.name.max_length {
                Some(limit) if length > limit => {
                    self.name.add_error(format!(
                        "Ensure this value has at most {} characters (it has {}).",
                        limit, length
                    ));
                    None
                }
                _ => Some(value),
            }
        });

        let start_date = clean_date(&mut self.start_date);
        let finish_date = clean_date(&mut self.finish_date);
        let owner = self.owner.clean_required();
        let description = self.description.clean_required().unwrap_or_default();

        if let (Some(start), Some(finish)) = (start_date, finish_date) {
            if finish < start {
                self.non_field_errors
                    .push(FINISH_BEFORE_START_MESSAGE.to_string());
            }
        }

        if self.has_errors() {
            return None;
        }

        let name = name?;
        let slug = slugify(&name);
        Some(Event {
            name,
            slug,
            start_date: start_date?,
            finish_date: finish_date?,
            owner: owner?,
            description,
        })
    }

    pub fn has_errors(&self) -> bool {
        !self.non_field_errors.is_empty() || self.fields().iter().any(|f| f.has_errors())
    }

    /// Fields in render order.
    pub fn fields(&self) -> [&BoundField; 5] {
        [
            &self.name,
            &self.start_date,
            &self.finish_date,
            &self.owner,
            &self.description,
        ]
    }
}

fn clean_date(field: &mut BoundField) -> Option<NaiveDate> {
    let raw = field.clean_required()?;
    match NaiveDate::parse_from_str(&raw, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            field.add_error(INVALID_DATE_MESSAGE);
            None
        }
    }
}

/// Reduce a name to a URL-safe identifier: lowercase word characters
/// with single hyphens where whitespace or hyphens were, everything
/// else dropped.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;
    for ch in name.chars() {
        // Word characters, underscore included, survive as-is; runs of
        // whitespace and hyphens collapse to one hyphen; anything else
        // is dropped without leaving a separator behind.
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch.to_ascii_lowercase());
            pending_separator = false;
        } else if ch.is_whitespace() || ch == '-' {
            pending_separator = true;
        }
    }
    slug
}
