//! Password validation and hashing
//!
//! Plain passwords only live long enough to be hashed. The stored form
//! is an argon2 PHC string.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;

use super::ValidationError;

/// Minimum password length
pub const MIN_PASSWORD_LEN: usize = 8;

/// Upper bound so hashing cost stays predictable
const MAX_PASSWORD_LEN: usize = 256;

/// Validated plain-text password
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Create a new password.
    ///
    /// # Rules
    /// - Non-empty
    /// - At least 8 characters
    /// - At most 256 characters
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "password" });
        }

        let len = s.chars().count();
        if len < MIN_PASSWORD_LEN {
            return Err(ValidationError::TooShort {
                field: "password",
                min: MIN_PASSWORD_LEN,
            });
        }

        if len > MAX_PASSWORD_LEN {
            return Err(ValidationError::TooLong {
                field: "password",
                max: MAX_PASSWORD_LEN,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Hash with argon2 and a fresh random salt.
    pub fn hash(&self) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default().hash_password(self.0.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    /// Check this password against a stored PHC string.
    #[cfg(test)]
    fn verify(&self, stored: &str) -> bool {
        use argon2::password_hash::{PasswordHash, PasswordVerifier};

        PasswordHash::new(stored)
            .and_then(|parsed| Argon2::default().verify_password(self.0.as_bytes(), &parsed))
            .is_ok()
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(****)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            Password::new("").unwrap_err(),
            ValidationError::Empty { .. }
        ));
    }

    #[test]
    fn rejects_short() {
        for short in ["a", "1234567", "seven77"] {
            assert!(matches!(
                Password::new(short).unwrap_err(),
                ValidationError::TooShort { min: 8, .. }
            ));
        }
    }

    #[test]
    fn accepts_eight_chars() {
        assert!(Password::new("12345678").is_ok());
    }

    #[test]
    fn counts_chars_not_bytes() {
        // 4 chars, 8+ bytes
        assert!(Password::new("éééé").is_err());
    }

    #[test]
    fn hash_roundtrip() {
        let password = Password::new("oliver91!").unwrap();
        let hash = password.hash().unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(password.verify(&hash));
        assert!(!Password::new("not-the-one").unwrap().verify(&hash));
    }

    #[test]
    fn debug_hides_value() {
        let password = Password::new("supersecret").unwrap();
        assert_eq!(format!("{:?}", password), "Password(****)");
    }
}
