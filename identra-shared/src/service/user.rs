/// User service
///
/// Orchestrates password hashing, token issuance/verification, and the
/// user repository. Field-presence rules are enforced here, before any
/// persistence call; repository errors pass through uninterpreted except
/// where a specific kind (missing row) maps to `NotFound`.
///
/// Token policy: login issues tokens with no expiry, and seals them when a
/// seal key is configured. Verification failures of any flavor — bad
/// password, bad signature, tampered seal — all surface as
/// `InvalidAuthentication`.

use crate::auth::{
    password::{hash_password, verify_password},
    seal::TokenSealer,
    token::TokenCodec,
};
use crate::models::user::{Language, NewUser, User, UserFilters, UserUpdate};
use crate::service::error::{ServiceError, ServiceResult};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Input for creating a user
///
/// Username, first/last name, password, and email are required; the rest
/// is optional context.
#[derive(Debug, Clone, Default)]
pub struct CreateUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub email: String,
    pub phone: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub external_token: Option<String>,
    pub language: String,
}

/// User service handle
///
/// Cheap to clone; the pool, codec, and sealer are shared and read-only
/// after construction.
#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
    codec: Arc<TokenCodec>,
    sealer: Option<Arc<TokenSealer>>,
}

impl UserService {
    /// Creates a service backed by the given pool and token primitives
    ///
    /// `sealer` is `None` when no seal key is configured; tokens then
    /// travel as bare JWTs.
    pub fn new(pool: PgPool, codec: Arc<TokenCodec>, sealer: Option<Arc<TokenSealer>>) -> Self {
        Self {
            pool,
            codec,
            sealer,
        }
    }

    /// Creates a user: validates presence, hashes the password, normalizes
    /// the language, and delegates persistence
    ///
    /// # Errors
    ///
    /// `FieldRequired` when username, first name, last name, password, or
    /// email is empty. Hashing failure is fatal to the operation.
    pub async fn create(&self, input: CreateUser) -> ServiceResult<User> {
        for (value, field) in [
            (&input.username, "username"),
            (&input.first_name, "first_name"),
            (&input.last_name, "last_name"),
            (&input.password, "password"),
            (&input.email, "email"),
        ] {
            if value.is_empty() {
                return Err(ServiceError::FieldRequired { field });
            }
        }

        let password_hash = hash_password(&input.password)?;

        let user = User::create(
            &self.pool,
            NewUser {
                username: input.username,
                first_name: input.first_name,
                last_name: input.last_name,
                password_hash,
                email: input.email,
                phone: input.phone,
                language: Language::normalize(&input.language),
                client_id: input.client_id,
                client_secret: input.client_secret,
                external_token: input.external_token,
            },
        )
        .await?;

        debug!(user_id = %user.id, "Created user");
        Ok(user)
    }

    /// Fetches a user by id
    pub async fn get(&self, id: Uuid) -> ServiceResult<User> {
        User::get(&self.pool, id)
            .await?
            .ok_or(ServiceError::NotFound { id })
    }

    /// Finds a user by username, case-insensitively
    ///
    /// Deprecated alternate login lookup: the login-by-username HTTP route
    /// is the only caller. `NotFound` carries a nil id because no id is
    /// known for a username miss.
    pub async fn find_by_username(&self, username: &str) -> ServiceResult<User> {
        User::find_by_username(&self.pool, username)
            .await?
            .ok_or(ServiceError::NotFound { id: Uuid::nil() })
    }

    /// Lists users matching the filters, newest first
    pub async fn get_all(
        &self,
        filters: &UserFilters,
        offset: i64,
        limit: i64,
    ) -> ServiceResult<Vec<User>> {
        Ok(User::get_all(&self.pool, filters, offset, limit).await?)
    }

    /// Counts matching users for pagination math
    pub async fn count(&self, filters: &UserFilters) -> ServiceResult<i64> {
        Ok(User::count(&self.pool, filters).await?)
    }

    /// Authenticates a user and issues a token
    ///
    /// The issued token never expires (explicit policy) and is sealed when
    /// a sealer is configured.
    pub async fn login(&self, user: &User, password: &str) -> ServiceResult<String> {
        if !self.password_matches(password, &user.password_hash) {
            warn!(user_id = %user.id, "Login failed");
            return Err(ServiceError::InvalidAuthentication);
        }

        let token = self.codec.issue(user.id, &user.username, 0)?;

        match &self.sealer {
            Some(sealer) => sealer
                .seal(&token)
                .map_err(|_| ServiceError::InvalidAuthentication),
            None => Ok(token),
        }
    }

    /// Verifies a token and confirms its subject matches the expected id
    ///
    /// Returns the user the token belongs to. Mismatched subject, invalid
    /// token, and broken seal are all `InvalidAuthentication`; a verified
    /// token whose user no longer exists is `NotFound`.
    pub async fn token_access(&self, id: Uuid, token: &str) -> ServiceResult<User> {
        let claims = self.verify_token(token)?;

        if claims.sub != id {
            return Err(ServiceError::InvalidAuthentication);
        }

        self.get(id).await
    }

    /// Loads the user a token belongs to, without an expected id
    pub async fn get_by_token(&self, token: &str) -> ServiceResult<User> {
        let claims = self.verify_token(token)?;
        self.get(claims.sub).await
    }

    /// Applies a partial update
    ///
    /// Absent fields are left untouched; present-but-empty first name, last
    /// name, or email is rejected. Zero affected rows is `NotFound`.
    pub async fn update(&self, id: Uuid, changes: UserUpdate) -> ServiceResult<()> {
        for (value, field) in [
            (&changes.first_name, "first_name"),
            (&changes.last_name, "last_name"),
            (&changes.email, "email"),
        ] {
            if matches!(value.as_deref(), Some("")) {
                return Err(ServiceError::FieldRequired { field });
            }
        }

        let rows = User::update(&self.pool, id, &changes).await?;
        if rows == 0 {
            return Err(ServiceError::NotFound { id });
        }

        debug!(user_id = %id, "Updated user");
        Ok(())
    }

    /// Changes a password after verifying the old one
    ///
    /// `InvalidPassword` on old-password mismatch, `NotFound` when the user
    /// is missing.
    pub async fn update_password(
        &self,
        id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> ServiceResult<()> {
        if old_password.is_empty() {
            return Err(ServiceError::FieldRequired {
                field: "old_password",
            });
        }
        if new_password.is_empty() {
            return Err(ServiceError::FieldRequired {
                field: "new_password",
            });
        }

        let user = self.get(id).await?;

        if !self.password_matches(old_password, &user.password_hash) {
            return Err(ServiceError::InvalidPassword);
        }

        let password_hash = hash_password(new_password)?;
        let rows = User::update_password(&self.pool, id, &password_hash).await?;
        if rows == 0 {
            return Err(ServiceError::NotFound { id });
        }

        debug!(user_id = %id, "Password changed");
        Ok(())
    }

    /// Deletes a user
    ///
    /// Intentionally a no-op: soft-delete semantics are defined in the
    /// schema but not wired up. The operation stays in the contract so the
    /// route keeps answering.
    pub async fn delete(&self, _id: Uuid) -> ServiceResult<()> {
        Ok(())
    }

    /// Opens the seal (when configured) and verifies the inner token
    fn verify_token(&self, token: &str) -> ServiceResult<crate::auth::token::Claims> {
        let raw = match &self.sealer {
            Some(sealer) => sealer
                .open(token)
                .map_err(|_| ServiceError::InvalidAuthentication)?,
            None => token.to_string(),
        };

        self.codec
            .verify(&raw)
            .map_err(|_| ServiceError::InvalidAuthentication)
    }

    /// Collapses wrong-password and malformed-hash into a plain mismatch
    fn password_matches(&self, password: &str, hash: &str) -> bool {
        verify_password(password, hash).unwrap_or(false)
    }
}
