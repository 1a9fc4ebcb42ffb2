//! Capability-key codec primitives: generation, hashing, and format validation.
//!
//! Capability keys are high-entropy bearer tokens, not passwords, so hashing uses
//! plain SHA-256 rather than a slow KDF like argon2, which targets password-grade
//! secrets and would be prohibitively expensive to run on every request.

use rand::Rng;
use rand::distr::Alphanumeric;
use sha2::{Digest, Sha256};

/// Generates an `n`-character key from the 62-character alphanumeric alphabet
/// using a cryptographically secure RNG.
pub fn generate_key(n: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(n)
        .map(char::from)
        .collect()
}

/// Hashes a plaintext capability key to a hex-encoded SHA-256 digest.
///
/// The output is >=256 bits and uniformly distributed, which is all that's
/// required for a lookup hash over a high-entropy secret.
pub fn hash_key(plaintext: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plaintext.as_bytes());
    hex::encode(hasher.finalize())
}

/// Returns true iff `s` matches `[A-Za-z0-9]{22,}` or the scoped form
/// `a_[A-Za-z0-9]{20,}`.
///
/// The `a_` prefix is a tier-agnostic identifier only; it does not by itself
/// grant or restrict a permission tier, which is still governed by the URL.
pub fn is_format_valid(s: &str) -> bool {
    if let Some(suffix) = s.strip_prefix("a_") {
        suffix.len() >= 20 && suffix.bytes().all(|b| b.is_ascii_alphanumeric())
    } else {
        s.len() >= 22 && s.bytes().all(|b| b.is_ascii_alphanumeric())
    }
}

/// Returns the prefix of a plaintext key safe to log for identification —
/// never the full key or its hash input.
pub fn display_prefix(plaintext: &str, len: usize) -> &str {
    let end = plaintext
        .char_indices()
        .nth(len)
        .map(|(idx, _)| idx)
        .unwrap_or(plaintext.len());
    &plaintext[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_key_has_requested_length_and_alphabet() {
        let key = generate_key(32);
        assert_eq!(key.len(), 32);
        assert!(key.bytes().all(|b| b.is_ascii_alphanumeric()));
    }

    #[test]
    fn hash_is_deterministic_and_hex() {
        let a = hash_key("plaintext-key");
        let b = hash_key("plaintext-key");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_keys_hash_differently() {
        assert_ne!(hash_key("key-one"), hash_key("key-two"));
    }

    #[test]
    fn format_validation_accepts_bare_and_scoped_keys() {
        assert!(is_format_valid(&"a".repeat(22)));
        assert!(is_format_valid(&format!("a_{}", "b".repeat(20))));
        assert!(!is_format_valid(&"a".repeat(21)));
        assert!(!is_format_valid(&format!("a_{}", "b".repeat(19))));
        assert!(!is_format_valid("not-alphanumeric!!!!!!"));
    }

    #[test]
    fn display_prefix_truncates_safely() {
        assert_eq!(display_prefix("abcdefgh", 4), "abcd");
        assert_eq!(display_prefix("ab", 4), "ab");
    }
}
