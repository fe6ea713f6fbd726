use validator::ValidateEmail;

/// Validates that the input looks like a valid email address
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.validate_email()
}

pub const MIN_PASSWORD_LEN: usize = 6;

/// Minimum-length check only. Strength estimation is out of scope here.
pub fn is_valid_password(password: &str) -> bool {
    password.len() >= MIN_PASSWORD_LEN
}

/// Subscription and user display names: 2-100 characters after trimming.
pub fn is_valid_name(name: &str) -> bool {
    let len = name.trim().chars().count();
    (2..=100).contains(&len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("test@example.com"));
        assert!(is_valid_email("user.name@domain.co.uk"));
        assert!(is_valid_email("user+tag@example.org"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("   "));
        assert!(!is_valid_email("notanemail"));
        assert!(!is_valid_email("@nodomain.com"));
        assert!(!is_valid_email("spaces in@email.com"));
    }

    #[test]
    fn test_password_length() {
        assert!(is_valid_password("secret"));
        assert!(is_valid_password("a-much-longer-passphrase"));
        assert!(!is_valid_password("short"));
        assert!(!is_valid_password(""));
    }

    #[test]
    fn test_names() {
        assert!(is_valid_name("Netflix"));
        assert!(is_valid_name("  ab  "));
        assert!(is_valid_name(&"x".repeat(100)));
        assert!(!is_valid_name("a"));
        assert!(!is_valid_name("   a   "));
        assert!(!is_valid_name(&"x".repeat(101)));
    }
}
