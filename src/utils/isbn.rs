//! ISBN canonicalisation and format validation.
//!
//! Validation is format-only: 10 or 13 decimal digits after normalisation.
//! Check digits are not verified.

/// Strip hyphens and whitespace. Never fails.
pub fn normalize(isbn: &str) -> String {
    isbn.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect()
}

/// True iff the normalised form is exactly 10 or 13 ASCII digits.
pub fn validate(isbn: &str) -> bool {
    let normalized = normalize(isbn);
    matches!(normalized.len(), 10 | 13) && normalized.bytes().all(|b| b.is_ascii_digit())
}
