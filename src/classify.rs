//! Heuristic detection of markup in freeform text messages.
//!
//! The board's text messages carry no content-type flag, so the client has
//! to guess whether a payload is meant as HTML. The rule mirrors what a
//! lenient browser parse would conclude: the text is markup when parsing it
//! produces at least one real element node beyond the implicit fragment
//! root. A message that is the literal string `<b>bold</b>` is therefore
//! indistinguishable from intentional markup; the per-message raw view is
//! the reader's way around that.

use scraper::Html;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Show the payload verbatim.
    Literal,
    /// Sanitize and render the payload as HTML.
    Markup,
}

/// Classify a text payload as literal text or renderable markup.
pub fn classify(text: &str) -> Classification {
    // Cheap pre-check: nothing tag-like can ever parse into an element.
    if !text.contains('<') {
        return Classification::Literal;
    }

    let fragment = Html::parse_fragment(text);

    // html5ever recovers from almost anything, so "parse failure" reduces
    // to "no element survived". The fragment root itself doesn't count.
    let root = fragment.root_element();
    let has_element = root
        .descendants()
        .filter(|node| node.id() != root.id())
        .any(|node| node.value().is_element());

    if has_element {
        Classification::Markup
    } else {
        Classification::Literal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_literal() {
        assert_eq!(classify("hello world"), Classification::Literal);
        assert_eq!(classify(""), Classification::Literal);
        assert_eq!(classify("line one\nline two"), Classification::Literal);
        assert_eq!(classify("tabs\tand  spaces"), Classification::Literal);
    }

    #[test]
    fn test_angle_brackets_without_elements_are_literal() {
        assert_eq!(classify("a < b && b > c"), Classification::Literal);
        assert_eq!(classify("5<6"), Classification::Literal);
        assert_eq!(classify("-> <- <=>"), Classification::Literal);
    }

    #[test]
    fn test_fragments_with_elements_are_markup() {
        assert_eq!(classify("<b>bold</b>"), Classification::Markup);
        assert_eq!(classify("<p>hi</p><p>there</p>"), Classification::Markup);
        assert_eq!(
            classify("before <a href=\"https://example.com\">link</a> after"),
            Classification::Markup
        );
        assert_eq!(classify("<div><span>nested</span></div>"), Classification::Markup);
    }

    #[test]
    fn test_unclosed_tags_still_classify_as_markup() {
        // Lenient parsing recovers these into real elements
        assert_eq!(classify("<b>no closing tag"), Classification::Markup);
        assert_eq!(classify("<ul><li>one<li>two"), Classification::Markup);
    }

    #[test]
    fn test_literal_markup_string_is_the_known_false_positive() {
        // Someone pasting HTML source *as text* gets the rendered view;
        // the raw toggle shows the original payload.
        assert_eq!(classify("<b>bold</b>"), Classification::Markup);
    }
}
