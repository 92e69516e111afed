//! Token derivation: OS randomness passed through a keyed HMAC-SHA256

use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

use crate::domain::entities::reflink::TOKEN_RANDOM_BYTES;
use crate::errors::DomainError;

type HmacSha256 = Hmac<Sha256>;

/// Produces hex-encoded reflink tokens keyed with a secret
///
/// Even a weak random source would not let an attacker predict tokens
/// without the key.
#[derive(Clone)]
pub struct TokenGenerator {
    hash_key: Vec<u8>,
}

impl TokenGenerator {
    pub fn new(hash_key: &str) -> Result<Self, DomainError> {
        if hash_key.is_empty() {
            return Err(DomainError::Configuration {
                message: "Reflink hash key must not be empty".to_string(),
            });
        }

        Ok(Self {
            hash_key: hash_key.as_bytes().to_vec(),
        })
    }

    /// Generate a fresh token from 40 random bytes
    pub fn generate(&self) -> Result<String, DomainError> {
        let mut raw = [0u8; TOKEN_RANDOM_BYTES];
        OsRng
            .try_fill_bytes(&mut raw)
            .map_err(|e| DomainError::TokenGeneration {
                message: format!("OS random source unavailable: {}", e),
            })?;

        self.derive(&raw)
    }

    /// HMAC the given bytes with the hash key
    pub fn derive(&self, raw: &[u8]) -> Result<String, DomainError> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.hash_key).map_err(|e| {
            DomainError::TokenGeneration {
                message: format!("Invalid HMAC key: {}", e),
            }
        })?;
        mac.update(raw);

        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

impl std::fmt::Debug for TokenGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGenerator")
            .field("hash_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::reflink::TOKEN_LENGTH;

    #[test]
    fn test_generated_token_format() {
        let generator = TokenGenerator::new("secret").unwrap();
        let token = generator.generate().unwrap();

        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generated_tokens_are_unique() {
        let generator = TokenGenerator::new("secret").unwrap();
        let tokens: std::collections::HashSet<String> =
            (0..100).map(|_| generator.generate().unwrap()).collect();

        assert_eq!(tokens.len(), 100);
    }

    #[test]
    fn test_derivation_depends_on_key() {
        let raw = [7u8; TOKEN_RANDOM_BYTES];
        let a = TokenGenerator::new("key-a").unwrap();
        let b = TokenGenerator::new("key-b").unwrap();

        assert_eq!(a.derive(&raw).unwrap(), a.derive(&raw).unwrap());
        assert_ne!(a.derive(&raw).unwrap(), b.derive(&raw).unwrap());
    }

    #[test]
    fn test_known_hmac_vector() {
        // RFC 4231 test case 2
        let generator = TokenGenerator::new("Jefe").unwrap();
        let token = generator.derive(b"what do ya want for nothing?").unwrap();

        assert_eq!(
            token,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_empty_key_rejected() {
        let result = TokenGenerator::new("");
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_debug_hides_key() {
        let generator = TokenGenerator::new("super-secret").unwrap();
        assert!(!format!("{:?}", generator).contains("super-secret"));
    }
}
