//! Account passwords: Argon2id PHC hashes stored on the `usuarios/<key>`
//! entry as `password_hash`.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use ipa_core::error::CoreError;

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn hash_password(password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// `Ok(false)` on a mismatch; `Err` only when `hash` is not a PHC string.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, HashError> {
    let parsed = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Rules for a password chosen by an administrator for a new account.
pub fn check_new_password(password: &str) -> Result<(), CoreError> {
    if password.trim().is_empty() {
        return Err(CoreError::Validation("Password must not be blank".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("correct-horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct-horse", &hash).unwrap());
        assert!(!verify_password("wrong-horse", &hash).unwrap());
    }

    #[test]
    fn legacy_or_corrupt_hash_is_an_error() {
        assert!(verify_password("x", "not-a-phc-string").is_err());
    }

    #[test]
    fn new_password_rules() {
        assert_matches!(check_new_password("short"), Err(CoreError::Validation(m)) if m.contains("at least 8"));
        assert_matches!(check_new_password("        "), Err(CoreError::Validation(m)) if m.contains("blank"));
        assert!(check_new_password("exactly8").is_ok());
        // Counted in characters, not bytes.
        assert!(check_new_password("ñçàèòíú").is_err());
    }
}
