/// Form-level format checks shared by the registration and contact forms.

pub fn valid_email(email: &str) -> bool {
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");

    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

/// Accepts common phone spellings: optional leading `+`, digits with
/// spaces or dashes in between, 10 to 15 digits total.
pub fn valid_phone(phone: &str) -> bool {
    let trimmed = phone.strip_prefix('+').unwrap_or(phone);
    let digits: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect();

    (10..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

pub fn present(value: Option<&String>) -> Option<&str> {
    value.map(|it| it.trim()).filter(|it| !it.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_checks() {
        assert!(valid_email("student@example.com"));
        assert!(valid_email("a.b+c@mail.example.in"));

        assert!(!valid_email("student"));
        assert!(!valid_email("student@"));
        assert!(!valid_email("@example.com"));
        assert!(!valid_email("student@example"));
        assert!(!valid_email("stu dent@example.com"));
    }

    #[test]
    fn phone_checks() {
        assert!(valid_phone("9876543210"));
        assert!(valid_phone("+91 98765 43210"));
        assert!(valid_phone("987-654-3210-9"));

        assert!(!valid_phone("12345"));
        assert!(!valid_phone("not-a-phone"));
        assert!(!valid_phone("98765432109876543210"));
    }

    #[test]
    fn present_trims_whitespace() {
        assert_eq!(present(Some(&"  x ".to_string())), Some("x"));
        assert_eq!(present(Some(&"   ".to_string())), None);
        assert_eq!(present(None), None);
    }
}
