use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Shortest password accepted at signup, counted in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Signup rule; returns the message shown to the user on failure.
pub fn check_length(plain: &str) -> Result<(), String> {
    if plain.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!("Password must be at least {MIN_PASSWORD_LEN} characters."));
    }
    Ok(())
}

fn argon_err(context: &'static str) -> impl FnOnce(password_hash::Error) -> anyhow::Error {
    move |e| {
        error!(error = %e, "{context}");
        anyhow::anyhow!("{context}: {e}")
    }
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(argon_err("argon2 hash failed"))?;
    Ok(hash.to_string())
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash is unreadable.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(argon_err("stored hash unreadable"))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_characters_is_enough() {
        assert!(check_length("abcdef").is_ok());
        assert!(check_length("ñandú!").is_ok());
        assert_eq!(
            check_length("abcde").unwrap_err(),
            "Password must be at least 6 characters."
        );
    }

    #[test]
    fn stored_hash_matches_only_its_password() {
        let hash = hash_password("leads4sale").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("leads4sale", &hash).unwrap());
        assert!(!verify_password("leads4rent", &hash).unwrap());
    }

    #[test]
    fn unreadable_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-valid-hash").is_err());
    }
}
