//! HTML building blocks.

/// Escape a value for interpolation into HTML text or attributes.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Wrap page content in the shared document shell. The stylesheet link
/// points under the static prefix, so the edge serves it from disk.
pub fn page(title: &str, body: &str) -> String {
    let mut html = String::with_capacity(body.len() + 512);
    html.push_str("<!DOCTYPE html>\n");
    html.push_str("<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>");
    html.push_str(&escape(title));
    html.push_str(" | Club Events</title>\n");
    html.push_str("<link rel=\"stylesheet\" href=\"/static/club.css\">\n");
    html.push_str("</head>\n<body>\n<div class=\"container\">\n");
    html.push_str(body);
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_markup_and_quotes() {
        assert_eq!(
            escape(r#"<b>&"fish"</b> 'n chips"#),
            "&lt;b&gt;&amp;&quot;fish&quot;&lt;/b&gt; &#x27;n chips"
        );
        assert_eq!(escape("plain text"), "plain text");
    }

    #[test]
    fn shell_escapes_the_title_and_links_the_stylesheet() {
        let html = page("A <title>", "<p>hello</p>");
        assert!(html.contains("<title>A &lt;title&gt; | Club Events</title>"));
        assert!(html.contains("href=\"/static/club.css\""));
        assert!(html.contains("<p>hello</p>"));
    }
}
