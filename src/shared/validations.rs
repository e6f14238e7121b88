//! Request field validation helpers

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// Digits, spaces, `+`, `-` and parentheses, 7 to 24 characters.
static PHONE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[0-9+\-() ]{7,24}$").ok());

/// Permissive phone-shape check. Expects an already trimmed value.
pub fn is_valid_phone(phone: &str) -> bool {
    let Some(pattern) = PHONE_PATTERN.as_ref() else {
        return false;
    };
    pattern.is_match(phone) && phone.chars().any(|c| c.is_ascii_digit())
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

pub fn validate_pagination(page: Option<u64>, limit: Option<u64>) -> (u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(50).clamp(1, 200);
    (page, limit)
}
