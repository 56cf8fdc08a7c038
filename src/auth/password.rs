// Password hashing utilities
// Uses bcrypt so stored credentials can be compared without keeping plaintext

use bcrypt::{hash, verify};

use crate::domain::errors::{PersonnelError, PersonnelResult};

pub use bcrypt::DEFAULT_COST;

/// Cheapest work factor bcrypt accepts
pub const MIN_COST: u32 = 4;

/// bcrypt ignores everything past this many bytes
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hashes a password using bcrypt
///
/// # Arguments
/// * `password` - The plaintext password to hash
/// * `cost` - bcrypt work factor (`MIN_COST` to 31)
///
/// Passwords longer than `MAX_PASSWORD_BYTES` are refused, since bcrypt
/// would silently compare only their prefix.
///
/// # Example
/// ```
/// use personnel::auth::password::{hash_password, MIN_COST};
///
/// let hash = hash_password("my_password", MIN_COST).expect("valid hash");
/// assert_ne!(hash, "my_password");
/// ```
pub fn hash_password(password: &str, cost: u32) -> PersonnelResult<String> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(PersonnelError::Credential(format!(
            "password is {} bytes, at most {} are allowed",
            password.len(),
            MAX_PASSWORD_BYTES
        )));
    }
    hash(password, cost).map_err(|e| PersonnelError::Credential(e.to_string()))
}

/// Verifies a password against a bcrypt hash
///
/// # Returns
/// * `Ok(true)` - The password is the one that produced `hash`
/// * `Ok(false)` - It is not, including any password too long to have been hashed
/// * `Err(PersonnelError::Credential)` - `hash` is not a bcrypt hash
///
/// # Example
/// ```
/// use personnel::auth::password::{hash_password, verify_password, MIN_COST};
///
/// let hash = hash_password("my_password", MIN_COST).unwrap();
/// assert!(verify_password("my_password", &hash).unwrap());
/// ```
pub fn verify_password(password: &str, hash: &str) -> PersonnelResult<bool> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Ok(false);
    }
    verify(password, hash).map_err(|e| PersonnelError::Credential(e.to_string()))
}
