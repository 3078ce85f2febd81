/// Role model and database operations
///
/// A role row assigns a bitmask of named roles to one (user, application)
/// pair. There is at most one row per pair; adding roles merges bits into
/// the existing row with a bitwise OR rather than inserting a second row.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE roles (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users (id),
///     app VARCHAR(100) NOT NULL,
///     role BIGINT NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (user_id, app)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Named roles and their bit positions
///
/// The wire format is the human-readable name; storage is the OR-combined
/// bitmask. The mapping is fixed: renumbering bits would reinterpret every
/// stored mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleName {
    Admin,
    Moderator,
    Editor,
    Viewer,
    Support,
}

impl RoleName {
    /// The bit this role occupies in the stored mask
    pub fn bit(&self) -> i64 {
        match self {
            RoleName::Admin => 1,
            RoleName::Moderator => 1 << 1,
            RoleName::Editor => 1 << 2,
            RoleName::Viewer => 1 << 3,
            RoleName::Support => 1 << 4,
        }
    }

    /// Parses a role name; `None` for anything outside the fixed set
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "admin" => Some(RoleName::Admin),
            "moderator" => Some(RoleName::Moderator),
            "editor" => Some(RoleName::Editor),
            "viewer" => Some(RoleName::Viewer),
            "support" => Some(RoleName::Support),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Admin => "admin",
            RoleName::Moderator => "moderator",
            RoleName::Editor => "editor",
            RoleName::Viewer => "viewer",
            RoleName::Support => "support",
        }
    }
}

/// Translates a list of role names into a single OR-combined bitmask
///
/// Stops at the first unrecognized name and returns it, so the caller can
/// reject the whole request before anything is written.
pub fn mask_from_names(names: &[String]) -> Result<i64, String> {
    let mut mask = 0i64;
    for name in names {
        match RoleName::parse(name) {
            Some(role) => mask |= role.bit(),
            None => return Err(name.clone()),
        }
    }
    Ok(mask)
}

/// A stored role assignment for one (user, application) pair
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Role {
    pub id: Uuid,

    /// Owning user (foreign reference, not ownership)
    pub user_id: Uuid,

    /// Application the mask applies to
    pub app: String,

    /// OR-combined bitmask of named roles
    pub role: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Whether the stored mask includes the named role
    pub fn has(&self, name: RoleName) -> bool {
        self.role & name.bit() != 0
    }
}

/// Exact-match filters for listing roles
#[derive(Debug, Clone, Default)]
pub struct RoleFilters {
    pub user_ids: Option<Vec<Uuid>>,
    pub apps: Option<Vec<String>>,
}

const ROLE_COLUMNS: &str = "id, user_id, app, role, created_at, updated_at";

impl Role {
    /// Inserts a zero-valued role row for a (user, app) pair
    ///
    /// A second insert for the same pair violates the unique constraint and
    /// surfaces as a database error.
    pub async fn create(pool: &PgPool, user_id: Uuid, app: &str) -> Result<Self, sqlx::Error> {
        let role = sqlx::query_as::<_, Role>(&format!(
            r#"
            INSERT INTO roles (user_id, app)
            VALUES ($1, $2)
            RETURNING {ROLE_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(app)
        .fetch_one(pool)
        .await?;

        Ok(role)
    }

    /// Finds the role row for a (user, app) pair
    pub async fn find(
        pool: &PgPool,
        user_id: Uuid,
        app: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let role = sqlx::query_as::<_, Role>(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles WHERE user_id = $1 AND app = $2"
        ))
        .bind(user_id)
        .bind(app)
        .fetch_optional(pool)
        .await?;

        Ok(role)
    }

    /// ORs additional bits into the stored mask; returns rows affected
    ///
    /// Zero rows means no row exists for the pair — the caller maps that to
    /// `UserAppNotFound`. OR-merging makes re-adding a role a no-op.
    pub async fn merge(
        pool: &PgPool,
        user_id: Uuid,
        app: &str,
        bits: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE roles SET role = role | $3, updated_at = NOW()
            WHERE user_id = $1 AND app = $2
            "#,
        )
        .bind(user_id)
        .bind(app)
        .bind(bits)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Lists roles matching the filters, newest first
    pub async fn get_all(
        pool: &PgPool,
        filters: &RoleFilters,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let roles = sqlx::query_as::<_, Role>(&format!(
            r#"
            SELECT {ROLE_COLUMNS} FROM roles
            WHERE ($1::uuid[] IS NULL OR user_id = ANY($1))
              AND ($2::text[] IS NULL OR app = ANY($2))
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        ))
        .bind(&filters.user_ids)
        .bind(&filters.apps)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(roles)
    }

    /// Counts roles matching the filters, ignoring pagination
    pub async fn count(pool: &PgPool, filters: &RoleFilters) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM roles
            WHERE ($1::uuid[] IS NULL OR user_id = ANY($1))
              AND ($2::text[] IS NULL OR app = ANY($2))
            "#,
        )
        .bind(&filters.user_ids)
        .bind(&filters.apps)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_bits_are_distinct() {
        let all = [
            RoleName::Admin,
            RoleName::Moderator,
            RoleName::Editor,
            RoleName::Viewer,
            RoleName::Support,
        ];

        let mut seen = 0i64;
        for role in all {
            assert_eq!(seen & role.bit(), 0, "{:?} overlaps another bit", role);
            seen |= role.bit();
        }
    }

    #[test]
    fn test_parse_roundtrip() {
        for name in ["admin", "moderator", "editor", "viewer", "support"] {
            let role = RoleName::parse(name).expect("Should parse");
            assert_eq!(role.as_str(), name);
        }
    }

    #[test]
    fn test_parse_unknown_name() {
        assert!(RoleName::parse("root").is_none());
        assert!(RoleName::parse("Admin").is_none());
        assert!(RoleName::parse("").is_none());
    }

    #[test]
    fn test_mask_from_names() {
        let names = vec!["admin".to_string(), "viewer".to_string()];
        assert_eq!(mask_from_names(&names).unwrap(), 1 | 8);
    }

    #[test]
    fn test_mask_from_names_is_idempotent() {
        let once = vec!["editor".to_string()];
        let twice = vec!["editor".to_string(), "editor".to_string()];

        assert_eq!(
            mask_from_names(&once).unwrap(),
            mask_from_names(&twice).unwrap()
        );
    }

    #[test]
    fn test_mask_from_names_stops_at_first_unknown() {
        let names = vec![
            "admin".to_string(),
            "wizard".to_string(),
            "also-bad".to_string(),
        ];

        assert_eq!(mask_from_names(&names).unwrap_err(), "wizard");
    }

    #[test]
    fn test_mask_from_empty_list_is_zero() {
        assert_eq!(mask_from_names(&[]).unwrap(), 0);
    }

    #[test]
    fn test_role_has() {
        let role = Role {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            app: "calendar".to_string(),
            role: RoleName::Admin.bit() | RoleName::Support.bit(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(role.has(RoleName::Admin));
        assert!(role.has(RoleName::Support));
        assert!(!role.has(RoleName::Viewer));
    }
}
