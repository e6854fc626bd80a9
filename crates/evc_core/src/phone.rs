//! Kyrgyz phone number normalization.
//!
//! Numbers are stored as bare digits (`996XXXXXXXXX`) and shown as
//! `+996 XXX XX XX..`.

const COUNTRY_CODE: &str = "996";
const MAX_DIGITS: usize = 12;
const LOCAL_DIGITS: usize = 9;

/// Keeps only the ASCII digits of `input`.
pub fn digits_only(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Normalizes whatever the user typed into the country-coded digit string.
///
/// A leading trunk `0` becomes the country code, a bare nine digit local
/// number gets the country code prepended, and the result is cut to twelve
/// digits.
pub fn normalize_kyrgyz_phone(input: &str) -> String {
    let mut phone = digits_only(input);
    if !phone.starts_with(COUNTRY_CODE) {
        if let Some(local) = phone.strip_prefix('0') {
            phone = format!("{COUNTRY_CODE}{local}");
        } else if phone.len() == LOCAL_DIGITS {
            phone = format!("{COUNTRY_CODE}{phone}");
        }
    }
    phone.truncate(MAX_DIGITS);
    phone
}

/// Formats partial or complete input for display while typing.
///
/// Digits are grouped 3-3-2-2 as far as they go; digits past the last
/// complete group stay attached to it.
pub fn format_kyrgyz_phone(input: &str) -> String {
    let phone = normalize_kyrgyz_phone(input);
    if phone.is_empty() {
        return phone;
    }
    if phone.len() < 3 {
        return format!("+{phone}");
    }

    let (head, mut rest) = phone.split_at(3);
    let mut formatted = format!("+{head}");
    for width in [3, 2, 2] {
        if rest.len() >= width {
            let (group, tail) = rest.split_at(width);
            formatted.push(' ');
            formatted.push_str(group);
            rest = tail;
        }
    }
    formatted.push_str(rest);
    formatted
}

pub fn is_valid_kyrgyz_phone(phone: &str) -> bool {
    let digits = digits_only(phone);
    digits.len() == MAX_DIGITS && digits.starts_with(COUNTRY_CODE)
}
