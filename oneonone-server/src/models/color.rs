//! Display colors for tags and user avatars

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

/// `#rgb` or `#rrggbb`
static HEX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#([0-9a-f]{3}|[0-9a-f]{6})$").expect("invalid color regex")
});

/// Avatar colors handed out to newly registered users
const USER_PALETTE: [&str; 6] = [
    "#86efac", "#67e8f9", "#a5b4fc", "#f0abfc", "#fcd34d", "#fca5a5",
];

/// Validated hex color, stored lowercase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexColor(String);

impl HexColor {
    /// Create a color from `#rgb` / `#rrggbb` (case-insensitive).
    ///
    /// # Example
    /// ```
    /// use oneonone_server::models::HexColor;
    ///
    /// assert_eq!(HexColor::new("#10B981").unwrap().as_str(), "#10b981");
    /// assert!(HexColor::new("green").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let lowered = s.trim().to_lowercase();

        if lowered.is_empty() {
            return Err(ValidationError::Empty { field: "color" });
        }

        if !HEX_RE.is_match(&lowered) {
            return Err(ValidationError::InvalidFormat {
                field: "color",
                reason: "must be a hex color like #10b981",
            });
        }

        Ok(Self(lowered))
    }

    /// Pick an avatar color for a user. Same key, same color.
    pub fn for_user(key: &str) -> Self {
        let sum: usize = key.bytes().map(usize::from).sum();
        Self(USER_PALETTE[sum % USER_PALETTE.len()].to_string())
    }

    /// Get the color as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}
