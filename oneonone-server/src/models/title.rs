//! Title validation for meetings and talking points

use super::ValidationError;

/// Validated title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title(String);

impl Title {
    /// Create a new title.
    ///
    /// # Rules
    /// - Non-empty (after trimming whitespace)
    ///
    /// # Example
    /// ```
    /// use oneonone_server::models::Title;
    ///
    /// assert!(Title::new("Quarterly review").is_ok());
    /// assert!(Title::new("").is_err());
    /// assert!(Title::new("   ").is_err());  // whitespace only
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "title" });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Get the title as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
