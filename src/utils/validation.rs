use std::borrow::Cow;

use validator::ValidationError;

use crate::utils::password::MAX_PASSWORD_LENGTH;

const PASSWORD_SPECIALS: &[char] = &['@', '$', '!', '%', '?', '&'];

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::from(message));
    error
}

/// 8 to 64 characters from letters, digits and `@$!%?&`, with at least one
/// of each of uppercase, lowercase, digit and special.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let allowed = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(&c));
    let length = password.chars().count();
    if length > MAX_PASSWORD_LENGTH {
        return Err(error(
            "password_too_long",
            "Password must not be more than 64 characters",
        ));
    }

    let strong = length >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(&c));

    if allowed && strong {
        Ok(())
    } else {
        Err(error(
            "weak_password",
            "Password must be 8+ characters with uppercase, lowercase, number, and special character.",
        ))
    }
}

pub fn validate_phone_10(phone: &str) -> Result<(), ValidationError> {
    if phone.len() == 10 && phone.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(error("invalid_phone", "Please enter a valid 10-digit phone number."))
    }
}

pub fn validate_contact_number(phone: &str) -> Result<(), ValidationError> {
    if (10..=15).contains(&phone.len()) && phone.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(error("invalid_contact_number", "Enter a valid contact number (10-15 digits)."))
    }
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error("blank", "Field cannot be blank"))
    } else {
        Ok(())
    }
}

pub fn validate_skills(skills: &[String]) -> Result<(), ValidationError> {
    if skills.iter().any(|s| !s.trim().is_empty()) {
        Ok(())
    } else {
        Err(error("skills_required", "At least one skill is required"))
    }
}

/// Strips markup from free text before it is stored.
pub fn clean_text(value: &str) -> String {
    ammonia::clean(value.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_password_passes() {
        assert!(validate_password_strength("Hire@2024x").is_ok());
    }

    #[test]
    fn weak_passwords_fail() {
        for weak in ["Sh@rt1", "alllowercase1@", "ALLUPPER1@", "NoDigits@@", "NoSpecial12", "Has Space@1A"] {
            assert!(validate_password_strength(weak).is_err(), "{weak}");
        }
    }

    #[test]
    fn overlong_strong_password_fails_validation_and_hashing_agrees() {
        let longest = format!("Aa1@{}", "b".repeat(MAX_PASSWORD_LENGTH - 4));
        assert!(validate_password_strength(&longest).is_ok());
        assert!(crate::utils::password::hash(longest.as_str()).is_ok());

        let too_long = format!("Aa1@{}", "b".repeat(70));
        let err = validate_password_strength(&too_long).unwrap_err();
        assert_eq!(err.code, "password_too_long");
    }

    #[test]
    fn phone_rules() {
        assert!(validate_phone_10("9876543210").is_ok());
        assert!(validate_phone_10("98765").is_err());
        assert!(validate_phone_10("98765abcde").is_err());
        assert!(validate_contact_number("919876543210").is_ok());
        assert!(validate_contact_number("1234567890123456").is_err());
    }

    #[test]
    fn skills_must_not_be_blank() {
        assert!(validate_skills(&["Plumber".to_string()]).is_ok());
        assert!(validate_skills(&[" ".to_string()]).is_err());
        assert!(validate_skills(&[]).is_err());
    }

    #[test]
    fn markup_is_stripped() {
        assert_eq!(clean_text("Fix <script>alert(1)</script>sink"), "Fix sink");
    }
}
