//! Recipient address value object

use std::fmt;

/// Reasons an address fails the grammar check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Nothing to check
    Empty,
    /// No `@` separator
    MissingAt,
    /// More than one `@`
    MultipleAt,
    /// Local part is empty, holds characters outside `[A-Za-z0-9._%+-]`, or
    /// has a leading, trailing or doubled dot
    InvalidLocalPart,
    /// Domain lacks a dot, holds illegal characters, has an empty label or
    /// one starting or ending with `-`, or has a bad top-level label
    InvalidDomain,
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            AddressError::Empty => "address is empty",
            AddressError::MissingAt => "missing '@'",
            AddressError::MultipleAt => "more than one '@'",
            AddressError::InvalidLocalPart => "invalid local part",
            AddressError::InvalidDomain => "invalid domain",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for AddressError {}

/// An email address known to match `local@domain.tld`
///
/// The local part uses `[A-Za-z0-9._%+-]`, the domain `[A-Za-z0-9.-]` with at
/// least one dot, and the final label is two or more ASCII letters. Both
/// sides are dot-separated atoms: no empty label anywhere, and no domain
/// label starting or ending with a hyphen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecipientAddress(String);

impl RecipientAddress {
    /// Check `value` against the address grammar
    ///
    /// The value is taken as-is; callers trim surrounding whitespace first.
    ///
    /// # Examples
    ///
    /// ```
    /// use casebook_domain::RecipientAddress;
    ///
    /// assert!(RecipientAddress::parse("ops@example.com").is_ok());
    /// assert!(RecipientAddress::parse("ops@localhost").is_err());
    /// ```
    pub fn parse(value: &str) -> Result<Self, AddressError> {
        if value.is_empty() {
            return Err(AddressError::Empty);
        }

        let mut parts = value.split('@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().ok_or(AddressError::MissingAt)?;
        if parts.next().is_some() {
            return Err(AddressError::MultipleAt);
        }

        if !local.chars().all(is_local_char) || local.split('.').any(str::is_empty) {
            return Err(AddressError::InvalidLocalPart);
        }

        if !domain.split('.').all(is_domain_label) {
            return Err(AddressError::InvalidDomain);
        }
        let (_, tld) = domain.rsplit_once('.').ok_or(AddressError::InvalidDomain)?;
        if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AddressError::InvalidDomain);
        }

        Ok(Self(value.to_string()))
    }

    /// Get the address as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Domain part of the address
    pub fn domain(&self) -> &str {
        self.0.rsplit_once('@').map(|(_, d)| d).unwrap_or_default()
    }
}

impl fmt::Display for RecipientAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RecipientAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_local_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-')
}

fn is_domain_label(label: &str) -> bool {
    !label.is_empty()
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
