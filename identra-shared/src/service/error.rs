/// Service error kinds
///
/// One tagged enum carries every failure a service operation can report.
/// Transports match on the kind to pick a wire status; contextual fields
/// (the missing id, the bad role name) ride along in the variant instead
/// of being baked into a sentinel message.

use crate::auth::{password::PasswordError, token::TokenError};
use uuid::Uuid;

/// Result alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Every failure kind the user and role services can report
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// No user with this id
    #[error("user '{id}' doesn't exist")]
    NotFound { id: Uuid },

    /// A required field was empty or missing
    #[error("{field} is required")]
    FieldRequired { field: &'static str },

    /// Bad credentials, bad token, or sealed-token failure — deliberately
    /// indistinguishable from each other
    #[error("invalid authentication")]
    InvalidAuthentication,

    /// Old password did not match on a password change
    #[error("invalid password")]
    InvalidPassword,

    /// Unrecognized role name in an add-roles request
    #[error("the '{name}' role isn't valid")]
    InvalidRole { name: String },

    /// No role row exists for this (user, app) pair
    #[error("user '{user_id}' with '{app}' app doesn't exist")]
    UserAppNotFound { user_id: Uuid, app: String },

    /// Password hashing failed (fatal to the calling operation)
    #[error(transparent)]
    Hash(#[from] PasswordError),

    /// Token signing failed (fatal to the calling operation)
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Opaque repository/infrastructure failure
    #[error("database error: {0}")]
    Repo(#[from] sqlx::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let id = Uuid::new_v4();

        let err = ServiceError::NotFound { id };
        assert!(err.to_string().contains(&id.to_string()));

        let err = ServiceError::FieldRequired { field: "username" };
        assert_eq!(err.to_string(), "username is required");

        let err = ServiceError::InvalidRole {
            name: "wizard".to_string(),
        };
        assert!(err.to_string().contains("wizard"));

        let err = ServiceError::UserAppNotFound {
            user_id: id,
            app: "calendar".to_string(),
        };
        assert!(err.to_string().contains("calendar"));
    }

    #[test]
    fn test_auth_failure_message_is_uniform() {
        // The message must not reveal whether the password, the token
        // signature, or the seal failed.
        let err = ServiceError::InvalidAuthentication;
        assert_eq!(err.to_string(), "invalid authentication");
    }
}
