//! Progressive `+7 (XXX) XXX-XX-XX` phone mask.
//!
//! The mask is applied on every `input` event, so it has to be stable under
//! repeated application and must never emit literals ahead of the digits the
//! user has typed.

#[cfg(test)]
#[path = "phone_test.rs"]
mod phone_test;

/// Maximum number of digits kept, country code included.
pub const MAX_DIGITS: usize = 11;

/// Constraint pattern carried by the phone field's `pattern` attribute.
pub const PHONE_PATTERN: &str = r"\+7 \(\d{3}\) \d{3}-\d{2}-\d{2}";

/// Message shown when the phone does not match [`PHONE_PATTERN`].
pub const PHONE_FORMAT_MESSAGE: &str = "Enter the phone in the format: +7 (900) 000-00-00";

/// Format raw input text as a (possibly partial) `+7` phone number.
///
/// Non-digits are dropped, the digits are truncated to [`MAX_DIGITS`] and a
/// leading trunk prefix `8` is normalized to the country code `7`. The first
/// digit is always rendered as `+7`.
#[must_use]
pub fn format_phone(raw: &str) -> String {
    let mut digits: Vec<char> = raw.chars().filter(char::is_ascii_digit).take(MAX_DIGITS).collect();
    if digits.first() == Some(&'8') {
        digits[0] = '7';
    }

    let n = digits.len();
    let group = |from: usize, to: usize| -> String { digits[from..to.min(n)].iter().collect() };

    let mut out = String::from("+7");
    if n > 1 {
        out.push_str(" (");
        out.push_str(&group(1, 4));
    }
    if n >= 5 {
        out.push_str(") ");
        out.push_str(&group(4, 7));
    }
    if n >= 8 {
        out.push('-');
        out.push_str(&group(7, 9));
    }
    if n >= 10 {
        out.push('-');
        out.push_str(&group(9, 11));
    }
    out
}

/// Whether `formatted` carries a full 11-digit number.
#[must_use]
pub fn is_complete(formatted: &str) -> bool {
    formatted.chars().filter(char::is_ascii_digit).count() == MAX_DIGITS
}
