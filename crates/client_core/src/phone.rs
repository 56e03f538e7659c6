//! North American phone input masking: `+1 (XXX)-XXX-XXXX`.

const NATIONAL_DIGITS: usize = 10;
const COUNTRY_PREFIX: &str = "+1";

/// Normalises whatever is currently in the phone box into the mask.
///
/// A bare `+`, `+1` or `+1 ` (the user backspacing through the prefix)
/// clears the field. When the raw value already carries the `+1` prefix its
/// leading `1` digit is the country code, not part of the number.
pub fn format_phone_input(raw: &str) -> String {
    if matches!(raw, "+" | "+1" | "+1 ") {
        return String::new();
    }

    let mut digits = phone_digits(raw);
    if raw.starts_with(COUNTRY_PREFIX) && digits.starts_with('1') {
        digits.remove(0);
    }
    digits.truncate(NATIONAL_DIGITS);

    format_phone_digits(&digits)
}

/// Renders up to ten national digits, growing the mask as digits arrive.
pub fn format_phone_digits(digits: &str) -> String {
    if digits.is_empty() {
        return String::new();
    }

    let digits: Vec<char> = digits.chars().take(NATIONAL_DIGITS).collect();
    let area: String = digits.iter().take(3).collect();
    let mut formatted = format!("{COUNTRY_PREFIX} ({area})");

    if digits.len() > 3 {
        formatted.push('-');
        formatted.extend(&digits[3..digits.len().min(6)]);
    }
    if digits.len() > 6 {
        formatted.push('-');
        formatted.extend(&digits[6..]);
    }

    formatted
}

pub fn phone_digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// The national digits of an already formatted value.
pub fn national_digits(formatted: &str) -> String {
    let mut digits = phone_digits(formatted);
    if formatted.starts_with(COUNTRY_PREFIX) && digits.starts_with('1') {
        digits.remove(0);
    }
    digits
}

#[cfg(test)]
#[path = "tests/phone_tests.rs"]
mod tests;
