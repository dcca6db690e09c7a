//! The event creation page.
//!
//! Renders the form the way the site's other pages expect it: one
//! form-group per field with label, control, error block and help text;
//! form-wide errors as alert boxes above the fields, in the order they
//! were recorded; the CSRF token as a hidden input.

use crate::forms::{BoundField, EventForm, Widget};
use crate::pages::html::{escape, page};

pub fn event_create_page(form: &EventForm, csrf_token: &str) -> String {
    let mut body = String::with_capacity(4096);
    body.push_str("<h1>Create event</h1>\n");
    body.push_str("<form method=\"post\" action=\"/events/create\" novalidate>\n");

    body.push_str("<input type=\"hidden\" name=\"csrf_token\" value=\"");
    body.push_str(&escape(csrf_token));
    body.push_str("\">\n");

    for error in &form.non_field_errors {
        body.push_str("<div class=\"alert alert-danger\" role=\"alert\">");
        body.push_str(&escape(error));
        body.push_str("</div>\n");
    }

    for field in form.fields() {
        render_field(&mut body, field);
    }

    body.push_str("<button type=\"submit\" class=\"btn btn-primary\">Create event</button>\n");
    body.push_str("</form>\n");
    body.push_str("<p><a href=\"/events/\">Back to events</a></p>\n");

    page("Create event", &body)
}

fn render_field(out: &mut String, field: &BoundField) {
    let id = field.id();

    out.push_str("<div class=\"form-group\">\n");

    out.push_str("<label for=\"");
    out.push_str(&id);
    out.push_str("\">");
    out.push_str(&escape(field.label));
    out.push_str("</label>\n");

    let class = if field.has_errors() {
        "form-control is-invalid"
    } else {
        "form-control"
    };

    match field.widget {
        Widget::Text | Widget::Date => {
            out.push_str("<input type=\"");
            out.push_str(match field.widget {
                Widget::Date => "date",
                _ => "text",
            });
            out.push_str("\" name=\"");
            out.push_str(field.name);
            out.push_str("\" id=\"");
            out.push_str(&id);
            out.push_str("\" class=\"");
            out.push_str(class);
            out.push_str("\" value=\"");
            out.push_str(&escape(&field.value));
            out.push('"');
            if let Some(limit) = field.max_length {
                out.push_str(&format!(" maxlength=\"{}\"", limit));
            }
            if field.required {
                out.push_str(" required");
            }
            out.push_str(">\n");
        }
        Widget::Textarea => {
            out.push_str("<textarea name=\"");
            out.push_str(field.name);
            out.push_str("\" id=\"");
            out.push_str(&id);
            out.push_str("\" class=\"");
            out.push_str(class);
            out.push_str("\" rows=\"5\"");
            if field.required {
                out.push_str(" required");
            }
            out.push('>');
            out.push_str(&escape(&field.value));
            out.push_str("</textarea>\n");
        }
    }

    if field.has_errors() {
        out.push_str("<div class=\"invalid-feedback\">");
        for (i, error) in field.errors.iter().enumerate() {
            if i > 0 {
                out.push_str("<br>");
            }
            out.push_str(&escape(error));
        }
        out.push_str("</div>\n");
    }

    if let Some(help) = field.help_text {
        out.push_str("<small class=\"form-text text-muted\">");
        out.push_str(&escape(help));
        out.push_str("</small>\n");
    }

    out.push_str("</div>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::EventFormData;

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn unbound_form_renders_every_field_with_label_and_id() {
        let html = event_create_page(&EventForm::empty(), "tok123");

        for (id, label) in [
            ("id_name", "Name"),
            ("id_start_date", "Start date"),
            ("id_finish_date", "Finish date"),
            ("id_owner", "Owner"),
            ("id_description", "Description"),
        ] {
            assert!(
                html.contains(&format!("<label for=\"{}\">{}</label>", id, label)),
                "missing label for {}",
                id
            );
            assert!(html.contains(&format!("id=\"{}\"", id)));
        }

        assert_eq!(count(&html, "invalid-feedback"), 0);
        assert_eq!(count(&html, "alert alert-danger"), 0);
        assert_eq!(count(&html, "is-invalid"), 0);
    }

    #[test]
    fn csrf_token_is_a_hidden_input_with_the_escaped_value() {
        let html = event_create_page(&EventForm::empty(), "abc\"><script>");
        assert!(html.contains(
            "<input type=\"hidden\" name=\"csrf_token\" value=\"abc&quot;&gt;&lt;script&gt;\">"
        ));
    }

    #[test]
    fn only_the_errored_field_gets_an_invalid_feedback_block() {
        let mut form = EventForm::bind(&EventFormData {
            name: None,
            start_date: Some("2026-03-01".to_string()),
            finish_date: Some("2026-03-02".to_string()),
            owner: Some("Sam".to_string()),
            ..Default::default()
        });
        assert!(form.validate().is_none());

        let html = event_create_page(&form, "tok");
        assert_eq!(count(&html, "invalid-feedback"), 1);
        assert_eq!(count(&html, "is-invalid"), 1);
        assert!(html.contains("This field is required."));
    }

    #[test]
    fn form_wide_errors_become_alert_blocks_in_order() {
        let mut form = EventForm::empty();
        form.non_field_errors.push("First problem.".to_string());
        form.non_field_errors.push("Second problem.".to_string());

        let html = event_create_page(&form, "tok");
        assert_eq!(count(&html, "alert alert-danger"), 2);

        let first = html.find("First problem.").unwrap();
        let second = html.find("Second problem.").unwrap();
        assert!(first < second, "alerts must keep their recorded order");
    }

    #[test]
    fn submitted_values_are_escaped_on_re_render() {
        let mut form = EventForm::bind(&EventFormData {
            name: Some("<script>alert(1)</script>".to_string()),
            description: Some("a > b & c".to_string()),
            ..Default::default()
        });
        assert!(form.validate().is_none());

        let html = event_create_page(&form, "tok");
        assert!(html.contains("value=\"&lt;script&gt;alert(1)&lt;/script&gt;\""));
        assert!(html.contains(">a &gt; b &amp; c</textarea>"));
        assert!(!html.contains("<script>alert(1)</script>"));
    }

    #[test]
    fn help_text_renders_only_where_defined() {
        let html = event_create_page(&EventForm::empty(), "tok");
        // start_date, finish_date and owner carry help text; name and
        // description do not.
        assert_eq!(count(&html, "form-text text-muted"), 3);
        assert!(html.contains("Format: YYYY-MM-DD."));
    }

    #[test]
    fn name_input_carries_its_length_limit() {
        let html = event_create_page(&EventForm::empty(), "tok");
        assert!(html.contains("maxlength=\"100\""));
    }
}
