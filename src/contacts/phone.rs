//! Phone number normalization

use std::fmt;

/// A canonical `+<digits>` phone token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Accept only text that is already `+` followed by one or more digits.
    pub fn parse_strict(text: &str) -> Option<Self> {
        let digits = text.trim().strip_prefix('+')?;
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(format!("+{digits}")))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The digits without the leading plus
    pub fn digits(&self) -> &str {
        self.0.trim_start_matches('+')
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reduce arbitrary text to a `+<digits>` token.
///
/// Every non-digit is dropped, including any `+` already present, and a
/// plus is prepended to what remains. Returns `None` when no digit is left.
/// A leading `00` is kept literally: `"0081234"` becomes `"+0081234"`.
pub fn normalize(raw: &str) -> Option<PhoneNumber> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        None
    } else {
        Some(PhoneNumber(format!("+{digits}")))
    }
}
