//! Canonicalization of titles, names and dates.
//!
//! Titles arrive with encoding debris (`\xc3\x28`), stray punctuation and
//! inconsistent casing; dates arrive in three formats depending on the source.
//! Both are reduced to one canonical form before records are compared.

use crate::error::DateParseError;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static HEX_ESCAPE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\x[0-9a-fA-F]{2}").unwrap());

static PUNCTUATION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s&À-ÿ-]").unwrap());

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Formats tried in order. Day-first wins for numeric dates; the month-first
/// reading is only reached when the day-first one is impossible.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d %B %Y", "%d/%m/%Y", "%m/%d/%Y"];

/// Normalizes a title (or journal/drug name) to its canonical form.
///
/// Escaped hex bytes are removed, punctuation other than `-` and `&` is
/// stripped, every word is title-cased and whitespace is collapsed.
/// The function is idempotent.
///
/// # Examples
///
/// ```
/// use druglink::normalize_title;
///
/// assert_eq!(normalize_title("  the  EFFECT of aspirin!\\xc3\\x28 "), "The Effect Of Aspirin");
/// assert_eq!(normalize_title(""), "");
/// ```
pub fn normalize_title(raw: &str) -> String {
    let text = HEX_ESCAPE_REGEX.replace_all(raw, "");
    let text = PUNCTUATION_REGEX.replace_all(&text, "");
    let text = title_case(&text);
    let text = WHITESPACE_REGEX.replace_all(&text, " ");
    text.trim().to_string()
}

/// Parses a date in `DD Month YYYY`, `DD/MM/YYYY` or `YYYY-MM-DD` format.
///
/// # Errors
///
/// Returns [`DateParseError`] when no supported format matches, including for
/// an empty string.
///
/// # Examples
///
/// ```
/// use druglink::normalize_date;
/// use chrono::NaiveDate;
///
/// let expected = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
/// assert_eq!(normalize_date("1 January 2020").unwrap(), expected);
/// assert_eq!(normalize_date("01/01/2020").unwrap(), expected);
/// assert_eq!(normalize_date("2020-01-01").unwrap(), expected);
/// ```
pub fn normalize_date(raw: &str) -> Result<NaiveDate, DateParseError> {
    let value = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .ok_or_else(|| DateParseError {
            value: raw.to_string(),
        })
}

/// Upper-cases the first cased character of every word and lower-cases the
/// rest. A word starts after any uncased character.
///
/// Characters whose case mapping expands to several characters are left
/// untouched, which keeps the operation idempotent.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_cased = false;
    for c in text.chars() {
        let mapped = if !is_cased(c) {
            c
        } else if previous_cased {
            single_mapping(c.to_lowercase()).unwrap_or(c)
        } else {
            single_mapping(c.to_uppercase()).unwrap_or(c)
        };
        out.push(mapped);
        previous_cased = is_cased(mapped);
    }
    out
}

fn is_cased(c: char) -> bool {
    c.is_lowercase() || c.is_uppercase()
}

fn single_mapping(mut mapping: impl Iterator<Item = char>) -> Option<char> {
    match (mapping.next(), mapping.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
