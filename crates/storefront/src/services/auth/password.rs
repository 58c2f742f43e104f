//! Password strength meter for the registration form.

use serde::Serialize;

use super::MIN_PASSWORD_LENGTH;

/// Strength bucket shown next to the password field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum PasswordStrength {
    TooShort,
    Weak,
    Fair,
    Good,
    Strong,
}

impl PasswordStrength {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TooShort => "Too short",
            Self::Weak => "Weak",
            Self::Fair => "Fair",
            Self::Good => "Good",
            Self::Strong => "Strong",
        }
    }

    /// Meter fill, 25-100.
    #[must_use]
    pub const fn percentage(self) -> u8 {
        match self {
            Self::TooShort | Self::Weak => 25,
            Self::Fair => 50,
            Self::Good => 75,
            Self::Strong => 100,
        }
    }
}

/// Score a password: 25 points each for 8+ characters, an uppercase letter,
/// a digit, and a character that is none of those.
#[must_use]
pub fn password_strength(password: &str) -> PasswordStrength {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return PasswordStrength::TooShort;
    }

    let checks = [
        password.chars().count() >= 8,
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];
    let score = checks.iter().filter(|&&passed| passed).count() * 25;

    match score {
        0..=25 => PasswordStrength::Weak,
        26..=50 => PasswordStrength::Fair,
        51..=75 => PasswordStrength::Good,
        _ => PasswordStrength::Strong,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strength_buckets() {
        assert_eq!(password_strength(""), PasswordStrength::TooShort);
        assert_eq!(password_strength("Ab1!x"), PasswordStrength::TooShort);
        assert_eq!(password_strength("abcdef"), PasswordStrength::Weak);
        assert_eq!(password_strength("abcdefgh"), PasswordStrength::Weak);
        assert_eq!(password_strength("Abcdefgh"), PasswordStrength::Fair);
        assert_eq!(password_strength("Abcdefg1"), PasswordStrength::Good);
        assert_eq!(password_strength("Abcdef1!"), PasswordStrength::Strong);
        assert_eq!(password_strength("abc12!"), PasswordStrength::Fair);
    }

    #[test]
    fn test_labels() {
        assert_eq!(PasswordStrength::TooShort.label(), "Too short");
        assert_eq!(PasswordStrength::Good.percentage(), 75);
        assert!(PasswordStrength::Strong > PasswordStrength::Weak);
    }
}
