/// API key generation and hashing
///
/// Keys identify accounts on every call except signup and health. They are
/// generated once at signup, returned to the caller in plaintext, and stored
/// only as a SHA-256 hash.
///
/// # Key Format
///
/// `acc_{32_chars}` - a fixed prefix plus 32 random base62 characters
/// ([A-Za-z0-9]), 36 characters total.
///
/// # Example
///
/// ```
/// use draftmill_shared::auth::api_key::{generate_api_key, hash_api_key, validate_api_key_format};
///
/// let (key, hash) = generate_api_key();
/// assert!(key.starts_with("acc_"));
/// assert!(validate_api_key_format(&key));
/// assert_eq!(hash, hash_api_key(&key));
/// ```

use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of the random part of the API key (characters)
const KEY_RANDOM_LENGTH: usize = 32;

/// API key prefix
const KEY_PREFIX: &str = "acc_";

/// Total length of an API key (prefix + random)
pub const API_KEY_LENGTH: usize = KEY_PREFIX.len() + KEY_RANDOM_LENGTH;

/// Generates a new API key
///
/// Returns the plaintext key together with its SHA-256 hash for storage.
/// Key space is 62^32, roughly 2^190 combinations.
pub fn generate_api_key() -> (String, String) {
    let random_part = generate_random_string(KEY_RANDOM_LENGTH);
    let key = format!("{}{}", KEY_PREFIX, random_part);
    let hash = hash_api_key(&key);

    (key, hash)
}

/// Generates a random base62 string
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Hashes an API key with SHA-256
///
/// Returns the hex-encoded digest (64 characters), the form stored in the
/// account record and used for lookups.
pub fn hash_api_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Validates API key format
///
/// Checks prefix, total length, and that the random part is alphanumeric.
/// A format check only; whether the key maps to an account is the gate's
/// business.
pub fn validate_api_key_format(key: &str) -> bool {
    if key.len() != API_KEY_LENGTH {
        return false;
    }

    if !key.starts_with(KEY_PREFIX) {
        return false;
    }

    let random_part = &key[KEY_PREFIX.len()..];
    random_part.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_api_key() {
        let (key1, hash1) = generate_api_key();
        let (key2, hash2) = generate_api_key();

        assert!(key1.starts_with("acc_"));
        assert_eq!(key1.len(), API_KEY_LENGTH);

        // Two generations never collide
        assert_ne!(key1, key2);
        assert_ne!(hash1, hash2);

        // SHA-256 hex is 64 chars
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_hash_api_key_deterministic() {
        let hash = hash_api_key("acc_test123");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_api_key("acc_test123"));
        assert_ne!(hash, hash_api_key("acc_other456"));
    }

    #[test]
    fn test_validate_api_key_format() {
        let (key, _) = generate_api_key();
        assert!(validate_api_key_format(&key));

        // Wrong prefix
        assert!(!validate_api_key_format("key_abcdefghijklmnopqrstuvwxyz123456"));

        // Too short
        assert!(!validate_api_key_format("acc_short"));

        // Too long
        assert!(!validate_api_key_format("acc_abcdefghijklmnopqrstuvwxyz1234567890"));

        // Special characters in random part
        assert!(!validate_api_key_format("acc_abcdefghijklmnopqrstuvwxyz!@#$%^"));

        // Empty
        assert!(!validate_api_key_format(""));
    }

    #[test]
    fn test_generated_keys_pass_format_check() {
        for _ in 0..20 {
            let (key, _) = generate_api_key();
            assert!(validate_api_key_format(&key));
        }
    }
}
