//! PBKDF2 password hashing.
//!
//! Hashes are stored as `pbkdf2:<iterations>:<hex salt>:<hex hash>`.

use super::AuthError;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

/// Iteration count for newly created hashes.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    hash_with_iterations(password, DEFAULT_ITERATIONS)
}

pub fn hash_with_iterations(password: &str, iterations: u32) -> String {
    let salt: [u8; SALT_LEN] = rand::random();
    let hash = derive(password, &salt, iterations);
    format!(
        "pbkdf2:{}:{}:{}",
        iterations,
        hex::encode(salt),
        hex::encode(hash)
    )
}

/// Check `password` against a stored hash.
///
/// Returns `Ok(false)` on mismatch and an error only when the stored value is
/// not a hash this module produced.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, AuthError> {
    let mut parts = stored.split(':');
    let (Some("pbkdf2"), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(AuthError::MalformedHash);
    };

    let iterations: u32 = iterations.parse().map_err(|_| AuthError::MalformedHash)?;
    let salt = hex::decode(salt).map_err(|_| AuthError::MalformedHash)?;
    let expected = hex::decode(expected).map_err(|_| AuthError::MalformedHash)?;

    let actual = derive(password, &salt, iterations);
    Ok(constant_time_eq(&actual, &expected))
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LEN] {
    let mut out = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    out
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.iter().zip(b) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_matching_password() {
        let stored = hash_with_iterations("hunter2", 1_000);
        assert!(verify_password("hunter2", &stored).unwrap());
        assert!(!verify_password("hunter3", &stored).unwrap());
    }

    #[test]
    fn salts_differ_between_hashes() {
        let a = hash_with_iterations("same", 1_000);
        let b = hash_with_iterations("same", 1_000);
        assert_ne!(a, b);
    }

    #[test]
    fn stored_format_has_four_fields() {
        let stored = hash_with_iterations("pw", 1_000);
        let parts: Vec<_> = stored.split(':').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "pbkdf2");
        assert_eq!(parts[1], "1000");
        assert_eq!(parts[2].len(), SALT_LEN * 2);
        assert_eq!(parts[3].len(), HASH_LEN * 2);
    }

    #[test]
    fn rejects_foreign_hash_formats() {
        assert!(matches!(
            verify_password("pw", "$2b$10$abcdef"),
            Err(AuthError::MalformedHash)
        ));
        assert!(matches!(
            verify_password("pw", "pbkdf2:many:00:00"),
            Err(AuthError::MalformedHash)
        ));
        assert!(matches!(
            verify_password("pw", ""),
            Err(AuthError::MalformedHash)
        ));
    }
}
