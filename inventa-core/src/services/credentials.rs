//! User credentials - Argon2 password hashes instead of cleartext

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::domain::result::{Error, Result};
use crate::domain::User;

/// Hash a password into a PHC string (`$argon2id$v=19$...`)
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::KeyDerivation(format!("failed to hash password: {}", e)))
}

/// Check a login attempt against the user's stored hash
///
/// Users without a hash cannot log in.
pub fn verify_password(user: &User, candidate: &str) -> bool {
    let Some(stored) = user.password_hash.as_deref() else {
        return false;
    };
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Set a new password on a user
pub fn set_password(user: &mut User, password: &str) -> Result<()> {
    user.password_hash = Some(hash_password(password)?);
    user.legacy_password = None;
    Ok(())
}
