//! Opaque tokens and their digests.
//!
//! Refresh tokens are random values handed to the client once; only their
//! SHA-256 digest is persisted. Invitation tokens use the same generator.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

/// A raw opaque token together with its digest.
#[derive(Debug, Clone)]
pub struct MintedToken {
    /// Value handed to the client.
    pub raw: String,
    /// Value persisted server-side.
    pub hash: String,
}

impl MintedToken {
    /// Generates a new token of `byte_length` random bytes.
    pub fn generate(byte_length: usize) -> Self {
        let raw = generate_opaque_token(byte_length);
        let hash = hash_token(&raw);
        Self { raw, hash }
    }
}

/// `byte_length` bytes from the OS CSPRNG, base64url-encoded without padding.
pub fn generate_opaque_token(byte_length: usize) -> String {
    let mut bytes = vec![0u8; byte_length];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Lowercase hex SHA-256 of the raw token.
pub fn hash_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_tokens_are_url_safe_and_sized() {
        let token = generate_opaque_token(32);
        // 32 bytes -> 43 base64 characters without padding
        assert_eq!(token.len(), 43);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_ne!(token, generate_opaque_token(32));
    }

    #[test]
    fn hash_is_deterministic_hex() {
        let raw = generate_opaque_token(32);
        let a = hash_token(&raw);
        let b = hash_token(&raw);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, hash_token("something else"));
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn minted_token_hash_matches_raw() {
        let minted = MintedToken::generate(32);
        assert_eq!(minted.hash, hash_token(&minted.raw));
    }
}
