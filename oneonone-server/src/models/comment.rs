//! Comment content validation

use super::ValidationError;

/// Validated comment content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentContent(String);

impl CommentContent {
    /// Create new comment content.
    ///
    /// # Rules
    /// - Non-empty (after trimming whitespace)
    ///
    /// Inner whitespace and line breaks are kept as written.
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.trim().is_empty() {
            return Err(ValidationError::Empty { field: "comment" });
        }

        Ok(Self(s.trim_end().to_owned()))
    }

    /// Get the content as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for CommentContent {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_line_breaks() {
        let content = CommentContent::new("line one\nline two\n").unwrap();
        assert_eq!(content.as_str(), "line one\nline two");
    }

    #[test]
    fn rejects_blank() {
        assert!(matches!(
            CommentContent::new("  \n ").unwrap_err(),
            ValidationError::Empty { .. }
        ));
    }

    #[test]
    fn long_content_is_kept() {
        assert_eq!(CommentContent::new(&"a".repeat(70_000)).unwrap().as_str().len(), 70_000);
    }
}
