//! Credential hashing. Only the PHC string produced here is ever stored.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

fn hasher() -> Argon2<'static> {
    Argon2::default()
}

/// Produces a `$argon2id$...` string; every call draws its own salt.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    hasher()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "could not hash password");
            anyhow::anyhow!("password hashing failed: {e}")
        })
}

/// A wrong password yields `Ok(false)`. Only an unreadable `stored` value
/// is an error.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| {
        error!(error = %e, "stored password hash is unreadable");
        anyhow::anyhow!("unreadable password hash: {e}")
    })?;
    Ok(hasher().verify_password(plain.as_bytes(), &parsed).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_hash_accepts_its_password() {
        let stored = hash_password("Secur3P@ssw0rd!").unwrap();
        assert!(verify_password("Secur3P@ssw0rd!", &stored).unwrap());
    }

    #[test]
    fn stored_hash_is_phc_argon2id() {
        for plain in ["p", "hunter2", "correct-horse-battery-staple"] {
            let stored = hash_password(plain).unwrap();
            assert_ne!(stored, plain);
            assert!(stored.starts_with("$argon2id$"));
        }
    }

    #[test]
    fn salts_differ_between_calls() {
        assert_ne!(hash_password("p").unwrap(), hash_password("p").unwrap());
    }

    #[test]
    fn wrong_password_is_false_not_error() {
        let stored = hash_password("correct-horse-battery-staple").unwrap();
        assert!(!verify_password("wrong-password", &stored).unwrap());
    }

    #[test]
    fn unreadable_stored_hash_is_an_error() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(err.to_string().contains("unreadable password hash"));
    }
}
