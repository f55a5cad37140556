//! Markup sanitization seam.
//!
//! Untrusted board content passes through here before it is rendered or
//! handed to the clipboard as HTML. The actual filtering is delegated to
//! `ammonia`, which strips scripts, event handlers, and anything else able
//! to execute in a rendering context while keeping benign structure.

use scraper::Html;

/// Sanitize raw markup into markup safe for rendering.
///
/// Never fails: pathological input comes back as empty or neutral markup
/// rather than an error reaching the render pass.
pub fn sanitize(raw: &str) -> String {
    ammonia::clean(raw)
}

/// Extract the text content of a sanitized fragment (the `textContent`
/// equivalent), used as the plain-text companion of rich clipboard writes
/// and as the fallback rendering.
pub fn plain_text(sanitized: &str) -> String {
    let fragment = Html::parse_fragment(sanitized);
    fragment.root_element().text().collect::<String>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripts_are_stripped() {
        let out = sanitize("<b>hi</b><script>alert(1)</script>");
        assert!(out.contains("<b>hi</b>"));
        assert!(!out.contains("script"));
        assert!(!out.contains("alert"));
    }

    #[test]
    fn test_event_handlers_are_stripped() {
        let out = sanitize(r#"<a href="https://example.com" onclick="evil()">x</a>"#);
        assert!(!out.contains("onclick"));
        assert!(out.contains("example.com"));
    }

    #[test]
    fn test_benign_structure_survives() {
        let out = sanitize("<p>one</p><p><i>two</i></p>");
        assert!(out.contains("<i>two</i>"));
    }

    #[test]
    fn test_plain_text_flattens_markup() {
        assert_eq!(plain_text("<p>one <b>two</b></p>"), "one two");
        assert_eq!(plain_text("no tags at all"), "no tags at all");
        assert_eq!(plain_text(""), "");
    }
}
