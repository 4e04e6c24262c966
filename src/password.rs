use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;

/// Hash a password into the Argon2id PHC string format. The salt is
/// generated per call, so the same password hashes differently each time.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC string. An unparsable hash
/// counts as a mismatch rather than an error; the caller only needs a
/// yes/no answer.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_phc_format_and_salted() {
        let h1 = hash_password("hunter2").unwrap();
        let h2 = hash_password("hunter2").unwrap();
        assert!(h1.starts_with("$argon2"));
        assert_ne!(h1, h2);
    }

    #[test]
    fn verify_accepts_correct_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash));
    }

    #[test]
    fn verify_rejects_wrong_password_and_garbage_hash() {
        let hash = hash_password("secret").unwrap();
        assert!(!verify_password("not the secret", &hash));
        assert!(!verify_password("secret", "not-a-phc-string"));
    }
}
