//! Registration/login input validation.

use serde::{Deserialize, Serialize};

use rogerbank_core::{DomainError, DomainResult};

const MAX_EMAIL_LEN: usize = 254;
const MAX_NAME_LEN: usize = 120;
const MAX_PASSWORD_LEN: usize = 128;

/// A normalized (trimmed, lower-cased) email address.
///
/// Validation is intentionally shallow: one `@`, a non-empty local part and
/// a dotted domain without whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn parse(input: &str) -> DomainResult<Self> {
        let normalized = input.trim().to_lowercase();

        if normalized.is_empty() {
            return Err(DomainError::validation("email is required"));
        }
        if normalized.len() > MAX_EMAIL_LEN || normalized.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("email is malformed"));
        }

        let (local, domain) = normalized
            .split_once('@')
            .ok_or_else(|| DomainError::validation("email is malformed"))?;

        let domain_ok = domain.contains('.')
            && !domain.contains('@')
            && !domain.starts_with('.')
            && !domain.ends_with('.');
        if local.is_empty() || !domain_ok {
            return Err(DomainError::validation("email is malformed"));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl core::fmt::Display for Email {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trim and bound a display name.
pub fn validate_name(input: &str) -> DomainResult<String> {
    let name = input.trim();
    if name.is_empty() {
        return Err(DomainError::validation("name is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation("name is too long"));
    }
    Ok(name.to_string())
}

/// Passwords are taken verbatim (no trimming); only emptiness and length are checked.
pub fn validate_password(input: &str) -> DomainResult<()> {
    if input.is_empty() {
        return Err(DomainError::validation("password is required"));
    }
    if input.chars().count() > MAX_PASSWORD_LEN {
        return Err(DomainError::validation("password is too long"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized() {
        let email = Email::parse("  Ana@X.com ").unwrap();
        assert_eq!(email.as_str(), "ana@x.com");
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for bad in ["", "ana", "ana@", "@x.com", "ana@x", "ana@@x.com", "a na@x.com", "ana@.com", "ana@x."] {
            assert!(Email::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn names_are_trimmed_and_required() {
        assert_eq!(validate_name("  Ana ").unwrap(), "Ana");
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn short_passwords_are_allowed_but_empty_ones_are_not() {
        assert!(validate_password("pw123").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password(&"p".repeat(MAX_PASSWORD_LEN + 1)).is_err());
    }
}
