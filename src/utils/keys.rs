use rand::{distr::Alphanumeric, Rng};
use sha2::{Digest, Sha256};

/// Database key for an email address: every `.` becomes `,`.
pub fn sanitize_email(email: &str) -> String {
    email.trim().to_lowercase().replace('.', ",")
}

pub fn generate_reset_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

/// Reset tokens are only ever stored as their SHA-256 digest.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_every_dot() {
        assert_eq!(sanitize_email("jane.doe@mail.example.com"), "jane,doe@mail,example,com");
    }

    #[test]
    fn sanitize_normalises_case_and_whitespace() {
        assert_eq!(sanitize_email("  Jane.Doe@Example.com "), "jane,doe@example,com");
    }

    #[test]
    fn reset_tokens_are_random_and_hash_deterministically() {
        let a = generate_reset_token();
        let b = generate_reset_token();
        assert_eq!(a.len(), 48);
        assert_ne!(a, b);
        assert_eq!(hash_token(&a), hash_token(&a));
        assert_eq!(hash_token(&a).len(), 64);
    }
}
