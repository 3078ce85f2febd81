/// Authentication primitives for Identra
///
/// This module provides the three cryptographic building blocks of the
/// service:
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`token`]: signed access tokens carrying user identity claims
/// - [`seal`]: optional AES-256-GCM wrapping of issued tokens for
///   transport opacity
///
/// All key material is injected at construction time from configuration;
/// nothing in this module reads the environment on its own.
///
/// # Example
///
/// ```no_run
/// use identra_shared::auth::password::{hash_password, verify_password};
/// use identra_shared::auth::token::TokenCodec;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let codec = TokenCodec::new("secret-key-at-least-32-bytes-long!!");
/// let token = codec.issue(Uuid::new_v4(), "alice", 0)?;
/// let claims = codec.verify(&token)?;
/// assert_eq!(claims.username, "alice");
/// # Ok(())
/// # }
/// ```

pub mod password;
pub mod seal;
pub mod token;
