//! Spanish NIF/CIF and phone validation.
//!
//! All checks are advisory: they never block data entry or persistence, and
//! an empty value is vacuously valid so no error shows before the user has
//! typed anything. The formatters are display helpers only; stored values are
//! never rewritten.

use once_cell::sync::Lazy;
use regex::Regex;

/// Check-letter alphabet for NIF numbers, indexed by `number mod 23`.
const NIF_LETTERS: &str = "TRWAGMYFPDXBNJZSQVHLCKE";

static NIF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{8}[A-Z]$").unwrap());
static CIF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ABCDEFGHJNPQRSUVW][0-9]{7}[0-9A-J]$").unwrap());
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+34|0034|34)?[6-9][0-9]{8}$").unwrap());
static NON_PHONE_CHARS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9+]").unwrap());

fn normalized(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Validate a personal NIF: 8 digits plus the matching check letter.
pub fn validate_nif(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    let clean = normalized(value);
    if !NIF_RE.is_match(&clean) {
        return false;
    }
    let Ok(number) = clean[..8].parse::<u32>() else {
        return false;
    };
    let expected = NIF_LETTERS.as_bytes()[(number % 23) as usize];
    clean.as_bytes()[8] == expected
}

/// Validate a business CIF: organisation letter, 7 digits, control character.
pub fn validate_cif(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    CIF_RE.is_match(&normalized(value))
}

/// Either form passes; used for the shared NIF/CIF field.
pub fn validate_nif_or_cif(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    validate_nif(value) || validate_cif(value)
}

/// Validate a Spanish phone number: optional country-code prefix, then nine
/// digits with a leading 6-9.
pub fn validate_spanish_phone(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    let clean: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    PHONE_RE.is_match(&clean)
}

/// Reformat a phone number as `+34 XXX XXX XXX` when it reduces to nine
/// digits; anything else is returned as typed.
pub fn format_spanish_phone(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    let mut clean = NON_PHONE_CHARS_RE.replace_all(value, "").to_string();
    clean = clean.trim_start_matches('0').to_string();
    clean = clean
        .strip_prefix("+34")
        .or_else(|| clean.strip_prefix("34"))
        .unwrap_or(&clean)
        .to_string();

    if clean.len() == 9 && clean.chars().all(|c| c.is_ascii_digit()) {
        format!("+34 {} {} {}", &clean[0..3], &clean[3..6], &clean[6..9])
    } else {
        value.to_string()
    }
}

/// Uppercase a NIF/CIF and drop whitespace for display.
pub fn format_nif_or_cif(value: &str) -> String {
    normalized(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nif_accepts_correct_check_letter() {
        // 12345678 mod 23 = 14 -> 'Z'
        assert!(validate_nif("12345678Z"));
        assert!(validate_nif("12345678z"));
        assert!(validate_nif(" 12 345 678 Z "));
    }

    #[test]
    fn nif_rejects_wrong_check_letter() {
        assert!(!validate_nif("12345678A"));
        assert!(!validate_nif("1234567Z"));
        assert!(!validate_nif("123456789"));
    }

    #[test]
    fn cif_shape() {
        assert!(validate_cif("B12345678"));
        assert!(validate_cif("b1234567j"));
        assert!(!validate_cif("I12345678")); // 'I' is not an allowed org letter
        assert!(!validate_cif("B1234567K")); // control outside 0-9/A-J
    }

    #[test]
    fn nif_or_cif_accepts_either() {
        assert!(validate_nif_or_cif("12345678Z"));
        assert!(validate_nif_or_cif("B12345678"));
        assert!(!validate_nif_or_cif("12345678A"));
        assert!(validate_nif_or_cif(""));
    }

    #[test]
    fn phone_accepts_spanish_numbers() {
        assert!(validate_spanish_phone("+34 600 000 000"));
        assert!(validate_spanish_phone("600000000"));
        assert!(validate_spanish_phone("0034600000000"));
        assert!(validate_spanish_phone("34944156677"));
        assert!(validate_spanish_phone(""));
    }

    #[test]
    fn phone_rejects_bad_leading_digit_and_length() {
        assert!(!validate_spanish_phone("123456789"));
        assert!(!validate_spanish_phone("60000000"));
        assert!(!validate_spanish_phone("+34 500 000 000"));
    }

    #[test]
    fn phone_formatter_normalizes_display() {
        assert_eq!(format_spanish_phone("600000000"), "+34 600 000 000");
        assert_eq!(format_spanish_phone("+34600000000"), "+34 600 000 000");
        assert_eq!(format_spanish_phone("34 600-00-00-00"), "+34 600 000 000");
        // Unformattable input comes back untouched.
        assert_eq!(format_spanish_phone("12345"), "12345");
        assert_eq!(format_spanish_phone(""), "");
    }

    #[test]
    fn nif_formatter_uppercases_and_strips() {
        assert_eq!(format_nif_or_cif(" b 1234567 j"), "B1234567J");
        assert_eq!(format_nif_or_cif(""), "");
    }
}
