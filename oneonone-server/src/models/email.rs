//! Email address validation

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

/// Loose shape check: local@domain, no whitespace
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+$").expect("invalid email regex"));

/// Validated, lowercased email address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Create a new email, trimming and lowercasing.
    ///
    /// # Example
    /// ```
    /// use oneonone_server::models::Email;
    ///
    /// assert_eq!(Email::new(" Oliver@Email.com ").unwrap().as_str(), "oliver@email.com");
    /// assert!(Email::new("oliver").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "email" });
        }

        if !EMAIL_RE.is_match(trimmed) {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "must look like name@domain",
            });
        }

        Ok(Self(trimmed.to_lowercase()))
    }

    /// Get the email as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
