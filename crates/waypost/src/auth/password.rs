//! Password hashing and policy.

use waypost_common::WaypostError;
use waypost_common::constants::password::{MAX_LEN, MIN_LEN};

/// Hash a password with bcrypt at the default cost
pub fn hash_password(plain: &str) -> Result<String, WaypostError> {
    bcrypt::hash(plain, bcrypt::DEFAULT_COST)
        .map_err(|e| WaypostError::Internal(format!("password hashing: {e}")))
}

/// Constant-time comparison of a password against a stored hash
pub fn verify_password(plain: &str, hash: &str) -> Result<bool, WaypostError> {
    bcrypt::verify(plain, hash)
        .map_err(|e| WaypostError::Internal(format!("password verification: {e}")))
}

/// Enforce the account password policy (length 8..=72)
pub fn validate_password(plain: &str) -> Result<(), WaypostError> {
    if plain.len() < MIN_LEN {
        return Err(WaypostError::InvalidInput(format!(
            "Password must be at least {MIN_LEN} characters"
        )));
    }
    if plain.len() > MAX_LEN {
        return Err(WaypostError::InvalidInput(format!(
            "Password must be at most {MAX_LEN} characters"
        )));
    }
    Ok(())
}
