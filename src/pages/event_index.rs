//! The event list page.

use crate::forms::Event;
use crate::pages::html::{escape, page};

pub fn event_index_page(events: &[Event]) -> String {
    let mut body = String::with_capacity(1024 + events.len() * 256);
    body.push_str("<h1>Events</h1>\n");
    body.push_str("<p><a class=\"btn btn-primary\" href=\"/events/create\">Create event</a></p>\n");

    if events.is_empty() {
        body.push_str("<p class=\"empty\">No events yet.</p>\n");
    } else {
        body.push_str("<table class=\"table\">\n<thead>\n<tr>");
        body.push_str("<th>Name</th><th>Slug</th><th>Start date</th><th>Finish date</th><th>Owner</th>");
        body.push_str("</tr>\n</thead>\n<tbody>\n");
        for event in events {
            body.push_str("<tr><td>");
            body.push_str(&escape(&event.name));
            body.push_str("</td><td><code>");
            body.push_str(&escape(&event.slug));
            body.push_str("</code></td><td>");
            body.push_str(&event.start_date.to_string());
            body.push_str("</td><td>");
            body.push_str(&event.finish_date.to_string());
            body.push_str("</td><td>");
            body.push_str(&escape(&event.owner));
            body.push_str("</td></tr>\n");
        }
        body.push_str("</tbody>\n</table>\n");
    }

    page("Events", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn event(name: &str, slug: &str) -> Event {
        Event {
            name: name.to_string(),
            slug: slug.to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            finish_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            owner: "Sam".to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn empty_list_shows_the_placeholder() {
        let html = event_index_page(&[]);
        assert!(html.contains("No events yet."));
        assert!(!html.contains("<table"));
    }

    #[test]
    fn events_render_in_order_with_their_slugs() {
        let html = event_index_page(&[
            event("Autumn Fair", "autumn-fair"),
            event("Winter Workshop", "winter-workshop"),
        ]);

        assert!(html.contains("Autumn Fair"));
        assert!(html.contains("<code>autumn-fair</code>"));
        assert!(html.contains("2026-03-01"));

        let first = html.find("Autumn Fair").unwrap();
        let second = html.find("Winter Workshop").unwrap();
        assert!(first < second);
    }

    #[test]
    fn names_are_escaped() {
        let html = event_index_page(&[event("<Tag> & Co", "tag-co")]);
        assert!(html.contains("&lt;Tag&gt; &amp; Co"));
    }
}
