/// User model and database operations
///
/// A user is identified by a UUID assigned at insert time and a unique
/// username compared case-insensitively for lookups and logins. The
/// password column only ever holds an Argon2id hash.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(70) NOT NULL,
///     first_name VARCHAR(255) NOT NULL,
///     last_name VARCHAR(255) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL,
///     phone VARCHAR(50) NOT NULL DEFAULT '',
///     photo VARCHAR(512),
///     language VARCHAR(5) NOT NULL DEFAULT 'en',
///     client_id VARCHAR(255),
///     client_secret VARCHAR(255),
///     external_token TEXT,
///     deleted_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// CREATE UNIQUE INDEX users_username_lower_idx ON users (LOWER(username));
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Preferred language for a user
///
/// Unrecognized input normalizes to the default rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Es,
}

impl Language {
    /// Normalizes arbitrary input into the enumerated set, defaulting to `En`
    pub fn normalize(input: &str) -> Self {
        match input.to_lowercase().as_str() {
            "es" => Language::Es,
            _ => Language::En,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
        }
    }
}

/// A stored user account
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Primary key, assigned by the repository at insert
    pub id: Uuid,

    /// Unique username (case-insensitive for lookups)
    pub username: String,

    pub first_name: String,
    pub last_name: String,

    /// Argon2id hash; never exposed in responses
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub email: String,
    pub phone: String,

    /// Optional profile photo URL
    pub photo: Option<String>,

    /// Preferred language ("en" or "es")
    pub language: String,

    /// External client credentials for federated contexts
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub external_token: Option<String>,

    /// Soft-delete marker; never set by current logic
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
///
/// The password must already be hashed; the service layer owns hashing.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub email: String,
    pub phone: String,
    pub language: Language,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub external_token: Option<String>,
}

/// Partial update of a user
///
/// Each field is independently optional: `None` leaves the stored value
/// untouched, `Some` overwrites it.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub photo: Option<String>,
    pub language: Option<Language>,
}

/// Exact-match filters for listing users
#[derive(Debug, Clone, Default)]
pub struct UserFilters {
    /// Username, compared case-insensitively
    pub username: Option<String>,

    /// Id-set membership
    pub ids: Option<Vec<Uuid>>,
}

const USER_COLUMNS: &str = "id, username, first_name, last_name, password_hash, email, phone, \
     photo, language, client_id, client_secret, external_token, \
     deleted_at, created_at, updated_at";

impl User {
    /// Inserts a new user and returns the stored row
    ///
    /// The database assigns the id and timestamps.
    pub async fn create(pool: &PgPool, data: NewUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, first_name, last_name, password_hash,
                               email, phone, language, client_id, client_secret, external_token)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.username)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.password_hash)
        .bind(data.email)
        .bind(data.phone)
        .bind(data.language.as_str())
        .bind(data.client_id)
        .bind(data.client_secret)
        .bind(data.external_token)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by id
    pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username, case-insensitively
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(username) = LOWER($1)"
        ))
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists users matching the filters, newest first
    pub async fn get_all(
        pool: &PgPool,
        filters: &UserFilters,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE ($1::text IS NULL OR LOWER(username) = LOWER($1))
              AND ($2::uuid[] IS NULL OR id = ANY($2))
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        ))
        .bind(&filters.username)
        .bind(&filters.ids)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Counts users matching the filters, ignoring pagination
    pub async fn count(pool: &PgPool, filters: &UserFilters) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM users
            WHERE ($1::text IS NULL OR LOWER(username) = LOWER($1))
              AND ($2::uuid[] IS NULL OR id = ANY($2))
            "#,
        )
        .bind(&filters.username)
        .bind(&filters.ids)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Applies a partial update; returns the number of rows affected
    ///
    /// Absent fields keep their stored value. Zero rows means the id did
    /// not match any user.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        changes: &UserUpdate,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name  = COALESCE($3, last_name),
                email      = COALESCE($4, email),
                phone      = COALESCE($5, phone),
                photo      = COALESCE($6, photo),
                language   = COALESCE($7, language),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.email)
        .bind(&changes.phone)
        .bind(&changes.photo)
        .bind(changes.language.map(|l| l.as_str()))
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Replaces the stored password hash; returns the number of rows affected
    pub async fn update_password(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_normalize() {
        assert_eq!(Language::normalize("en"), Language::En);
        assert_eq!(Language::normalize("es"), Language::Es);
        assert_eq!(Language::normalize("ES"), Language::Es);
        assert_eq!(Language::normalize("fr"), Language::En);
        assert_eq!(Language::normalize(""), Language::En);
    }

    #[test]
    fn test_language_as_str() {
        assert_eq!(Language::En.as_str(), "en");
        assert_eq!(Language::Es.as_str(), "es");
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            email: "alice@example.com".to_string(),
            phone: String::new(),
            photo: None,
            language: "en".to_string(),
            client_id: None,
            client_secret: None,
            external_token: None,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2id"));
        assert!(json.contains("alice"));
    }

    #[test]
    fn test_user_update_default_is_empty() {
        let changes = UserUpdate::default();
        assert!(changes.first_name.is_none());
        assert!(changes.last_name.is_none());
        assert!(changes.email.is_none());
        assert!(changes.phone.is_none());
        assert!(changes.photo.is_none());
        assert!(changes.language.is_none());
    }
}
