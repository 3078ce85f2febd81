/// Access token codec
///
/// Issues and verifies the signed claim sets that act as Identra's bearer
/// tokens. Tokens are signed with HS256 using a symmetric key loaded from
/// configuration at startup and held inside the codec; there is no ambient
/// key lookup.
///
/// # Expiry policy
///
/// A ttl of zero means the token carries no `exp` claim at all and verifies
/// indefinitely. This is a deliberate policy choice (login tokens never
/// expire), not an omission. Any non-zero ttl is an expiry in seconds from
/// issuance.
///
/// # Security
///
/// Verification pins the algorithm to HS256: a token whose header names any
/// other algorithm is rejected before signature checking, which defends
/// against algorithm-substitution attacks.
///
/// # Example
///
/// ```
/// use identra_shared::auth::token::TokenCodec;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let codec = TokenCodec::new("test-secret-key-at-least-32-bytes-long");
/// let user_id = Uuid::new_v4();
///
/// let token = codec.issue(user_id, "alice", 0)?;
/// let claims = codec.verify(&token)?;
/// assert_eq!(claims.sub, user_id);
/// assert_eq!(claims.username, "alice");
/// assert!(claims.exp.is_none());
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to sign a token
    #[error("Failed to sign token: {0}")]
    Signing(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Bad signature, wrong algorithm, or malformed token
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Claims carried by an access token
///
/// `sub` is the user id, `username` is a custom claim, and `exp` is absent
/// for never-expiring tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID
    pub sub: Uuid,

    /// Username (custom claim)
    pub username: String,

    /// Expiration time (Unix timestamp), absent when the token never expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl Claims {
    /// Builds claims for a user, with an expiry when `ttl_seconds` is non-zero
    pub fn new(user_id: Uuid, username: &str, ttl_seconds: u64) -> Self {
        let exp = if ttl_seconds == 0 {
            None
        } else {
            Some((Utc::now() + Duration::seconds(ttl_seconds as i64)).timestamp())
        };

        Self {
            sub: user_id,
            username: username.to_string(),
            exp,
        }
    }

    /// Whether the token carries an expiry that has passed
    pub fn is_expired(&self) -> bool {
        match self.exp {
            Some(exp) => Utc::now().timestamp() >= exp,
            None => false,
        }
    }
}

/// Signs and verifies access tokens with a fixed symmetric key
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Creates a codec from the configured signing secret
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens issued with ttl 0 carry no exp claim; expiry is still
        // enforced whenever the claim is present.
        validation.required_spec_claims.clear();
        validation.validate_exp = true;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issues a signed token for a user
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if the key is unusable for signing.
    pub fn issue(&self, user_id: Uuid, username: &str, ttl_seconds: u64) -> Result<String, TokenError> {
        let claims = Claims::new(user_id, username, ttl_seconds);
        let header = Header::new(Algorithm::HS256);

        encode(&header, &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(format!("Token encoding failed: {}", e)))
    }

    /// Verifies a token's signature and expiry and returns its claims
    ///
    /// # Errors
    ///
    /// - `TokenError::Expired` when the exp claim has passed
    /// - `TokenError::Invalid` for a bad signature, an unexpected signing
    ///   algorithm, or a malformed token
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_without_ttl_have_no_expiry() {
        let claims = Claims::new(Uuid::new_v4(), "alice", 0);
        assert!(claims.exp.is_none());
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_claims_with_ttl_expire() {
        let claims = Claims::new(Uuid::new_v4(), "alice", 3600);
        let exp = claims.exp.expect("Should carry expiry");

        let seconds_left = exp - Utc::now().timestamp();
        assert!(seconds_left > 3500 && seconds_left <= 3600);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_issue_and_verify() {
        let codec = TokenCodec::new(SECRET);
        let user_id = Uuid::new_v4();

        let token = codec.issue(user_id, "alice", 0).expect("Should issue");
        let claims = codec.verify(&token).expect("Should verify");

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.username, "alice");
        assert!(claims.exp.is_none());
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let codec = TokenCodec::new(SECRET);
        let other = TokenCodec::new("another-secret-key-of-sufficient-len");

        let token = codec.issue(Uuid::new_v4(), "alice", 0).expect("Should issue");
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_verify_expired_token() {
        // Build an already-expired claim set by hand and sign it directly.
        let codec = TokenCodec::new(SECRET);
        let claims = Claims {
            sub: Uuid::new_v4(),
            username: "alice".to_string(),
            exp: Some(Utc::now().timestamp() - 3600),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(claims.is_expired());
        let result = codec.verify(&token);
        assert!(matches!(result.unwrap_err(), TokenError::Expired));
    }

    #[test]
    fn test_verify_rejects_other_algorithm() {
        // HS384 signature over the same claims must be rejected by the
        // pinned-algorithm validation even though the key matches.
        let codec = TokenCodec::new(SECRET);
        let claims = Claims::new(Uuid::new_v4(), "alice", 0);
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(codec.verify(&token).is_err());
    }

    #[test]
    fn test_verify_malformed_token() {
        let codec = TokenCodec::new(SECRET);
        assert!(codec.verify("not-a-token").is_err());
        assert!(codec.verify("").is_err());
        assert!(codec.verify("a.b.c").is_err());
    }

    #[test]
    fn test_token_with_short_ttl_still_valid() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.issue(Uuid::new_v4(), "bob", 60).expect("Should issue");

        let claims = codec.verify(&token).expect("Should verify before expiry");
        assert!(claims.exp.is_some());
    }
}
