/// Role service
///
/// Manages per-application role bitmasks for users. Role-name translation
/// happens entirely before any write: one unrecognized name rejects the
/// whole request, so a failed add never partially applies.

use crate::models::role::{mask_from_names, Role, RoleFilters};
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::user::UserService;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

/// Role service handle
#[derive(Clone)]
pub struct RoleService {
    pool: PgPool,
    users: UserService,
}

impl RoleService {
    /// Creates a service backed by the given pool
    ///
    /// Holds a user service handle for existence checks on role creation.
    pub fn new(pool: PgPool, users: UserService) -> Self {
        Self { pool, users }
    }

    /// Creates a zero-valued role row for a (user, app) pair
    ///
    /// The user must exist; a duplicate pair surfaces as the repository's
    /// constraint violation.
    pub async fn create(&self, user_id: Uuid, app: &str) -> ServiceResult<Role> {
        if app.is_empty() {
            return Err(ServiceError::FieldRequired { field: "app" });
        }

        // Existence check via the user service so a bad id reports
        // NotFound instead of a foreign-key error.
        self.users.get(user_id).await?;

        let role = Role::create(&self.pool, user_id, app).await?;
        debug!(role_id = %role.id, user_id = %user_id, app, "Created role");
        Ok(role)
    }

    /// ORs named roles into the stored mask for a (user, app) pair
    ///
    /// # Errors
    ///
    /// - `InvalidRole` with the first unrecognized name; nothing is written
    /// - `UserAppNotFound` when no row exists for the pair
    pub async fn add_roles(
        &self,
        user_id: Uuid,
        app: &str,
        names: &[String],
    ) -> ServiceResult<()> {
        let bits = mask_from_names(names).map_err(|name| ServiceError::InvalidRole { name })?;

        let rows = Role::merge(&self.pool, user_id, app, bits).await?;
        if rows == 0 {
            return Err(ServiceError::UserAppNotFound {
                user_id,
                app: app.to_string(),
            });
        }

        debug!(user_id = %user_id, app, bits, "Merged roles");
        Ok(())
    }

    /// Fetches the role row for a (user, app) pair
    pub async fn get(&self, user_id: Uuid, app: &str) -> ServiceResult<Role> {
        Role::find(&self.pool, user_id, app)
            .await?
            .ok_or_else(|| ServiceError::UserAppNotFound {
                user_id,
                app: app.to_string(),
            })
    }

    /// Lists roles matching the filters, newest first
    pub async fn get_all(
        &self,
        filters: &RoleFilters,
        offset: i64,
        limit: i64,
    ) -> ServiceResult<Vec<Role>> {
        Ok(Role::get_all(&self.pool, filters, offset, limit).await?)
    }

    /// Counts matching roles for pagination math
    pub async fn count(&self, filters: &RoleFilters) -> ServiceResult<i64> {
        Ok(Role::count(&self.pool, filters).await?)
    }
}
