/// Error handling for the API server
///
/// Provides a unified error type that maps to HTTP responses. Handlers
/// return `Result<T, ApiError>` which converts to the uniform envelope
/// with the matching HTTP status code. Service errors are matched by kind,
/// never by message.

use crate::response::Envelope;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use identra_shared::service::ServiceError;
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - e.g. duplicate username
    Conflict(String),

    /// Internal server error (500)
    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match self {
            // Log internal errors but don't expose details to clients
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => msg,
        };

        let body = Json(Envelope::<()> {
            status: status.as_u16(),
            message: Some(message),
            data: None,
            meta: None,
        });

        (status, body).into_response()
    }
}

/// Maps service error kinds to HTTP statuses
///
/// Validation errors → 400, auth failures → 401, missing records → 404,
/// everything infrastructural → 500 (except unique-constraint violations,
/// which are a 409 for the caller).
impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            ServiceError::FieldRequired { .. } => ApiError::BadRequest(err.to_string()),
            ServiceError::InvalidAuthentication => ApiError::Unauthorized(err.to_string()),
            ServiceError::InvalidPassword => ApiError::BadRequest(err.to_string()),
            ServiceError::InvalidRole { .. } => ApiError::BadRequest(err.to_string()),
            ServiceError::UserAppNotFound { .. } => ApiError::NotFound(err.to_string()),
            ServiceError::Repo(db_err) => db_err.into(),
            ServiceError::Hash(e) => ApiError::InternalError(e.to_string()),
            ServiceError::Token(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // Check for unique constraint violations
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("username") {
                        return ApiError::Conflict("Username already exists".to_string());
                    }
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("User not found".to_string());
        assert_eq!(err.to_string(), "Not found: User not found");
    }

    #[test]
    fn test_service_error_status_mapping() {
        let cases: Vec<(ServiceError, StatusCode)> = vec![
            (
                ServiceError::NotFound { id: Uuid::new_v4() },
                StatusCode::NOT_FOUND,
            ),
            (
                ServiceError::FieldRequired { field: "username" },
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::InvalidAuthentication,
                StatusCode::UNAUTHORIZED,
            ),
            (ServiceError::InvalidPassword, StatusCode::BAD_REQUEST),
            (
                ServiceError::InvalidRole {
                    name: "wizard".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::UserAppNotFound {
                    user_id: Uuid::new_v4(),
                    app: "calendar".to_string(),
                },
                StatusCode::NOT_FOUND,
            ),
        ];

        for (service_err, expected) in cases {
            let api_err: ApiError = service_err.into();
            assert_eq!(api_err.status(), expected);
        }
    }

    #[test]
    fn test_row_not_found_maps_to_404() {
        let api_err: ApiError = sqlx::Error::RowNotFound.into();
        assert_eq!(api_err.status(), StatusCode::NOT_FOUND);
    }
}
