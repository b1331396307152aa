//! Pure text helpers shared by the services: pulling tickers and JSON out of
//! free text, and cleaning up text for display.

pub mod html;
pub mod markdown;
pub mod plan_json;
pub mod ticker;

use regex::Regex;
use std::sync::OnceLock;

fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}
