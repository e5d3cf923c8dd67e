//! Cryptographic utilities for guest magic tokens.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of random bytes behind a magic token (256 bits of entropy).
const MAGIC_TOKEN_BYTES: usize = 32;

/// Length of the fingerprint written to logs in place of a token.
const FINGERPRINT_LEN: usize = 12;

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generates an unguessable, URL-safe magic token for a guest invitation.
pub fn generate_magic_token() -> String {
    let mut bytes = [0u8; MAGIC_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Short, non-reversible identifier for a token, safe to put in logs.
pub fn token_fingerprint(token: &str) -> String {
    let mut hash = sha256_hex(token);
    hash.truncate(FINGERPRINT_LEN);
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sha256_hex() {
        let hash = sha256_hex("test");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_sha256_hex_deterministic() {
        assert_eq!(sha256_hex("same_input"), sha256_hex("same_input"));
        assert_ne!(sha256_hex("input1"), sha256_hex("input2"));
    }

    #[test]
    fn test_magic_token_length_and_charset() {
        let token = generate_magic_token();
        // 32 bytes, base64 without padding
        assert_eq!(token.len(), 43);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_magic_tokens_are_unique() {
        let tokens: HashSet<String> = (0..500).map(|_| generate_magic_token()).collect();
        assert_eq!(tokens.len(), 500);
    }

    #[test]
    fn test_token_fingerprint() {
        let fp = token_fingerprint("abc");
        assert_eq!(fp.len(), FINGERPRINT_LEN);
        assert!(sha256_hex("abc").starts_with(&fp));
        assert_ne!(token_fingerprint("abc"), token_fingerprint("abd"));
    }
}
