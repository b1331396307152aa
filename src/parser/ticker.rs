use regex::Regex;
use std::sync::OnceLock;

use super::get_regex;

/// First cashtag in the message (`$AAPL` yields `AAPL`). Only upper-case
/// symbols of one to five letters count.
#[must_use]
pub fn extract_cashtag(message: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"\$([A-Z]{1,5})");

    re.captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Symbols accepted on quote routes: letters plus `.` for share classes and
/// exchange suffixes (`BRK.B`, `TSCO.LON`).
#[must_use]
pub fn is_valid_symbol(symbol: &str) -> bool {
    !symbol.is_empty()
        && symbol.len() <= 10
        && symbol.chars().all(|c| c.is_ascii_alphabetic() || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_cashtag() {
        assert_eq!(extract_cashtag("How is $TSLA doing?").as_deref(), Some("TSLA"));
        assert_eq!(extract_cashtag("$AAPL vs $MSFT").as_deref(), Some("AAPL"));
        assert_eq!(extract_cashtag("$GOOGLE").as_deref(), Some("GOOGL"));
        assert_eq!(extract_cashtag("$tsla"), None);
        assert_eq!(extract_cashtag("I have $100"), None);
    }

    #[test]
    fn test_is_valid_symbol() {
        assert!(is_valid_symbol("AAPL"));
        assert!(is_valid_symbol("BRK.B"));
        assert!(!is_valid_symbol(""));
        assert!(!is_valid_symbol("AAPL;DROP"));
        assert!(!is_valid_symbol("VERYLONGSYMBOL"));
    }
}
