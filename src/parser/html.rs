use regex::Regex;
use std::sync::OnceLock;

use super::get_regex;

/// Turns provider-supplied HTML-ish text into plain text: entities are
/// decoded, script/style blocks are dropped with their content, and any
/// remaining tags are removed.
#[must_use]
pub fn sanitize_text(text: &str) -> String {
    static BLOCKS: OnceLock<Regex> = OnceLock::new();
    static TAGS: OnceLock<Regex> = OnceLock::new();

    let decoded = html_escape::decode_html_entities(text).replace('\u{a0}', " ");

    let without_blocks = get_regex(
        &BLOCKS,
        r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>",
    )
    .replace_all(&decoded, "");

    let without_tags =
        get_regex(&TAGS, r"</?[A-Za-z][^<>]*>").replace_all(&without_blocks, "");

    without_tags.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_entities() {
        assert_eq!(
            sanitize_text("Johnson &amp; Johnson &quot;beats&quot; &#39;estimates&#39;"),
            "Johnson & Johnson \"beats\" 'estimates'"
        );
        assert_eq!(sanitize_text("a&nbsp;b"), "a b");
    }

    #[test]
    fn test_strips_markup() {
        assert_eq!(
            sanitize_text("<p>Shares <b>rose</b></p><script>alert(1)</script>"),
            "Shares rose"
        );
        assert_eq!(
            sanitize_text("&lt;img src=x onerror=alert(1)&gt;Headline"),
            "Headline"
        );
    }

    #[test]
    fn test_keeps_comparisons() {
        assert_eq!(sanitize_text("EPS 1 &lt; 2 and 3 &gt; 2"), "EPS 1 < 2 and 3 > 2");
    }
}
