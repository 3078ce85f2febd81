/// Token sealing with AES-256-GCM
///
/// An issued token can optionally be wrapped in authenticated symmetric
/// encryption so that the JWT structure is not visible on the wire. The
/// sealed form is hex encoded with the random 12-byte nonce prepended to
/// the ciphertext; opening strips the nonce back off.
///
/// Every failure mode on open (short input, bad hex, failed authentication)
/// is reported as the same `SealError::Open` so the layer cannot be used as
/// a decryption oracle.
///
/// # Example
///
/// ```
/// use identra_shared::auth::seal::TokenSealer;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let key = "6470fc52afd689ca17df8667729b2c0460ce90b781a01b0010d2c4c31c85cb21";
/// let sealer = TokenSealer::new(key)?;
///
/// let opaque = sealer.seal("eyJhbGciOi...")?;
/// assert_eq!(sealer.open(&opaque)?, "eyJhbGciOi...");
/// # Ok(())
/// # }
/// ```

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;

const NONCE_LEN: usize = 12;

/// Error type for token sealing operations
#[derive(Debug, thiserror::Error)]
pub enum SealError {
    /// Key is not 32 bytes of hex
    #[error("Invalid seal key: {0}")]
    InvalidKey(String),

    /// Encryption failed
    #[error("Failed to seal token: {0}")]
    Seal(String),

    /// Any open failure: malformed input or failed authentication
    #[error("Failed to open sealed token")]
    Open,
}

/// Wraps and unwraps tokens with a fixed AES-256-GCM key
pub struct TokenSealer {
    cipher: Aes256Gcm,
}

impl TokenSealer {
    /// Creates a sealer from a 64-character hex key (32 bytes)
    pub fn new(hex_key: &str) -> Result<Self, SealError> {
        let key_bytes = hex::decode(hex_key)
            .map_err(|e| SealError::InvalidKey(format!("Failed to decode hex: {}", e)))?;

        if key_bytes.len() != 32 {
            return Err(SealError::InvalidKey(format!(
                "Key must be 32 bytes (256 bits), got {} bytes",
                key_bytes.len()
            )));
        }

        let key = aes_gcm::Key::<Aes256Gcm>::from_slice(&key_bytes);
        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    /// Seals a token: hex(nonce || ciphertext || tag)
    pub fn seal(&self, token: &str) -> Result<String, SealError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, token.as_bytes())
            .map_err(|e| SealError::Seal(format!("AES-GCM failed: {}", e)))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);

        Ok(hex::encode(sealed))
    }

    /// Opens a sealed token back into the original string
    ///
    /// # Errors
    ///
    /// Returns `SealError::Open` for any malformed or tampered input.
    pub fn open(&self, sealed: &str) -> Result<String, SealError> {
        let bytes = hex::decode(sealed).map_err(|_| SealError::Open)?;

        // Need at least nonce + GCM tag.
        if bytes.len() < NONCE_LEN + 16 {
            return Err(SealError::Open);
        }

        let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| SealError::Open)?;

        String::from_utf8(plaintext).map_err(|_| SealError::Open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "6470fc52afd689ca17df8667729b2c0460ce90b781a01b0010d2c4c31c85cb21";

    #[test]
    fn test_seal_open_roundtrip() {
        let sealer = TokenSealer::new(KEY).expect("Key should parse");

        let token = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.payload.signature";
        let sealed = sealer.seal(token).expect("Should seal");
        let opened = sealer.open(&sealed).expect("Should open");

        assert_eq!(opened, token);
    }

    #[test]
    fn test_seal_is_randomized() {
        let sealer = TokenSealer::new(KEY).expect("Key should parse");

        let sealed1 = sealer.seal("same-token").expect("Should seal");
        let sealed2 = sealer.seal("same-token").expect("Should seal");

        // Fresh nonce each time means different ciphertext for the same input.
        assert_ne!(sealed1, sealed2);
    }

    #[test]
    fn test_open_tampered_ciphertext_fails() {
        let sealer = TokenSealer::new(KEY).expect("Key should parse");

        let sealed = sealer.seal("token").expect("Should seal");
        let mut bytes = hex::decode(&sealed).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let tampered = hex::encode(bytes);

        assert!(matches!(sealer.open(&tampered), Err(SealError::Open)));
    }

    #[test]
    fn test_open_truncated_input_fails() {
        let sealer = TokenSealer::new(KEY).expect("Key should parse");

        assert!(matches!(sealer.open(""), Err(SealError::Open)));
        assert!(matches!(sealer.open("deadbeef"), Err(SealError::Open)));
    }

    #[test]
    fn test_open_non_hex_input_fails() {
        let sealer = TokenSealer::new(KEY).expect("Key should parse");

        assert!(matches!(sealer.open("not hex at all!"), Err(SealError::Open)));
    }

    #[test]
    fn test_open_with_wrong_key_fails() {
        let sealer = TokenSealer::new(KEY).expect("Key should parse");
        let other = TokenSealer::new(
            "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
        )
        .expect("Key should parse");

        let sealed = sealer.seal("token").expect("Should seal");
        assert!(matches!(other.open(&sealed), Err(SealError::Open)));
    }

    #[test]
    fn test_invalid_key_rejected() {
        assert!(TokenSealer::new("too-short").is_err());
        assert!(TokenSealer::new("abcd").is_err());
        // 16 bytes is valid hex but the wrong length for AES-256.
        assert!(TokenSealer::new("000102030405060708090a0b0c0d0e0f").is_err());
    }
}
