//! Phone number normalization.
//!
//! Phones are the matching key between customer accounts, leads, and
//! self-registered partner profiles, so every code path that touches one
//! must agree on a single canonical form: digits only.

/// Reduce a raw phone input to its canonical digits-only form.
///
/// Returns `None` when the input cannot be a phone number (empty, too short,
/// too long after stripping separators). Callers on the read path treat
/// `None` as the degraded/fallback case, never an error.
pub fn normalize_phone(raw: &str) -> Option<String> {
  let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
  if (7..=15).contains(&digits.len()) {
    Some(digits)
  } else {
    None
  }
}
