//! Structural cues shared by every report layout.

use regex::Regex;
use std::sync::LazyLock;

static LOAN_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4,}$").unwrap());

static AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?(\d{1,3}(,\d{3})+|\d+)\.\d{2}$").unwrap());

static DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").unwrap());

static PAGE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^page\s+\d+(\s+of\s+\d+)?$").unwrap());

static NAME_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<name>.*[^\d\s])\s*(?P<code>\d{2})$").unwrap());

static TERM_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<term>\d+) (?P<date>\d{2}/\d{2}/\d{4})$").unwrap());

pub fn is_loan_number(s: &str) -> bool {
    LOAN_NUMBER.is_match(s)
}

/// Digits with optional thousands separators and exactly two decimals.
pub fn is_amount(s: &str) -> bool {
    AMOUNT.is_match(s)
}

pub fn is_date(s: &str) -> bool {
    DATE.is_match(s)
}

pub fn is_page_marker(s: &str) -> bool {
    PAGE_MARKER.is_match(s)
}

/// Split `"Smith 07"` / `"Smith07"` into `("Smith", "07")`.
pub fn split_name_code(s: &str) -> Option<(&str, &str)> {
    let caps = NAME_CODE.captures(s)?;
    let name = caps.name("name")?.as_str().trim_end();
    let code = caps.name("code")?.as_str();
    Some((name, code))
}

/// Split `"360 01/15/2045"` into `("360", "01/15/2045")`.
pub fn split_term_date(s: &str) -> Option<(&str, &str)> {
    let caps = TERM_DATE.captures(s)?;
    Some((caps.name("term")?.as_str(), caps.name("date")?.as_str()))
}

/// Find the first whitespace-separated token starting with `marker`
/// followed by at least one alphanumeric character, e.g. `CMR105`.
pub fn find_code<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    line.split_whitespace().find(|tok| {
        tok.strip_prefix(marker)
            .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric()))
    })
}
