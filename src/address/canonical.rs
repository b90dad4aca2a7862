//! Canonical address forms and the E.164 canonicalizer.

use std::fmt;

use super::AddressError;

/// Prefix that marks a destination as an encoded group id.
pub const GROUP_PREFIX: &str = "__textsecure_group__!";

/// Fewest digits accepted after the `+`.
const MIN_DIGITS: usize = 8;

/// Most digits accepted after the `+` (ITU-T E.164 limit).
const MAX_DIGITS: usize = 15;

/// The canonical form of a destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CanonicalAddress {
    /// An individual, in E.164 form (`+15551234567`).
    Number(String),
    /// An encoded group id (`__textsecure_group__!<hex>`).
    Group(String),
}

impl CanonicalAddress {
    /// Borrow the canonical string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Number(s) | Self::Group(s) => s,
        }
    }

    /// Consume into the canonical string.
    pub fn into_string(self) -> String {
        match self {
            Self::Number(s) | Self::Group(s) => s,
        }
    }

    /// Whether this address denotes a group.
    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }
}

impl fmt::Display for CanonicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turns raw destination input into a [`CanonicalAddress`].
pub trait Canonicalizer: Send + Sync {
    /// Canonicalize a raw destination.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::InvalidAddress`] for malformed input.
    fn canonicalize(&self, raw: &str) -> Result<CanonicalAddress, AddressError>;
}

/// Canonicalizes phone numbers to E.164 relative to a local country code.
///
/// Visual separators are dropped, a leading `00` is read as the
/// international prefix, and national numbers get the local country code
/// (after removing a trunk `0`). Encoded group ids pass through unchanged.
#[derive(Debug, Clone)]
pub struct E164Canonicalizer {
    local_country_code: String,
}

impl E164Canonicalizer {
    /// Create a canonicalizer for the given country calling code (`"1"`, `"44"`).
    pub fn new(local_country_code: impl Into<String>) -> Self {
        Self {
            local_country_code: local_country_code.into().trim_start_matches('+').to_owned(),
        }
    }
}

impl Default for E164Canonicalizer {
    fn default() -> Self {
        Self::new("1")
    }
}

impl Canonicalizer for E164Canonicalizer {
    fn canonicalize(&self, raw: &str) -> Result<CanonicalAddress, AddressError> {
        let trimmed = raw.trim();
        let invalid = || AddressError::InvalidAddress(raw.to_owned());

        if let Some(id) = trimmed.strip_prefix(GROUP_PREFIX) {
            if id.is_empty() || !id.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            return Ok(CanonicalAddress::Group(trimmed.to_owned()));
        }

        let stripped: String = trimmed
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
            .collect();
        if stripped.is_empty() {
            return Err(invalid());
        }

        let digits = if let Some(rest) = stripped.strip_prefix('+') {
            rest.to_owned()
        } else if let Some(rest) = stripped.strip_prefix("00") {
            rest.to_owned()
        } else {
            format!(
                "{}{}",
                self.local_country_code,
                stripped.trim_start_matches('0')
            )
        };

        if !(MIN_DIGITS..=MAX_DIGITS).contains(&digits.len())
            || !digits.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        Ok(CanonicalAddress::Number(format!("+{digits}")))
    }
}
