use regex::Regex;
use std::sync::OnceLock;

use super::get_regex;

/// Removes the markdown an LLM tends to add even when told not to:
/// bold and italic markers and leading `-` bullets.
#[must_use]
pub fn strip_markdown(text: &str) -> String {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    static ITALIC: OnceLock<Regex> = OnceLock::new();
    static DASH_RUN: OnceLock<Regex> = OnceLock::new();
    static BULLET: OnceLock<Regex> = OnceLock::new();

    let text = get_regex(&BOLD, r"\*\*(.*?)\*\*").replace_all(text, "$1");
    let text = get_regex(&ITALIC, r"\*(.*?)\*").replace_all(&text, "$1");
    let text = get_regex(&DASH_RUN, r"(?m)^-+\s").replace_all(&text, "");
    let text = get_regex(&BULLET, r"(?m)^\s*-\s+").replace_all(&text, "");

    text.into_owned()
}
