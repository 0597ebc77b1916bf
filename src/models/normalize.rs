//! Key normalization for the geo-reference and postal-code lookups.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Accent-stripped, uppercased city key with inner whitespace collapsed.
///
/// Idempotent: `normalize_city(&normalize_city(s)) == normalize_city(s)`.
pub fn normalize_city(city: &str) -> String {
    let upper: String = city.chars().flat_map(char::to_uppercase).collect();
    let folded: String = upper.nfd().filter(|c| !is_combining_mark(*c)).collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trimmed, uppercased state code.
pub fn normalize_state(state: &str) -> String {
    state.trim().to_ascii_uppercase()
}

/// Two ASCII letters after normalization.
pub fn is_valid_state_code(state: &str) -> bool {
    state.len() == 2 && state.chars().all(|c| c.is_ascii_alphabetic())
}

/// Postal code with separators and whitespace removed.
pub fn normalize_postal_code(code: &str) -> String {
    code.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}
