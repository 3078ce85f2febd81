/// gRPC auth surface
///
/// Exposes the token access check to internal services over tonic. The
/// reply mirrors the HTTP token-access payload: an authorization flag and
/// the resolved user.

use identra_shared::service::{ServiceError, UserService};
use tonic::{Request, Response, Status};
use tracing::debug;
use uuid::Uuid;

pub mod authpb {
    tonic::include_proto!("identra.auth.v1");
}

use authpb::auth_server::{Auth, AuthServer};
use authpb::{AuthReply, AuthRequest};

/// gRPC auth service
pub struct AuthService {
    users: UserService,
}

impl AuthService {
    pub fn new(users: UserService) -> Self {
        Self { users }
    }

    /// Wraps the service for registration with a tonic server
    pub fn into_server(self) -> AuthServer<AuthService> {
        AuthServer::new(self)
    }
}

#[tonic::async_trait]
impl Auth for AuthService {
    /// Verifies a token against the expected user id
    ///
    /// Invalid and mismatched tokens are `unauthenticated`; a verified
    /// token whose user is gone is `not_found`.
    async fn get_auth(&self, request: Request<AuthRequest>) -> Result<Response<AuthReply>, Status> {
        let req = request.into_inner();

        let id = req
            .id
            .parse::<Uuid>()
            .map_err(|_| Status::invalid_argument("id must be a UUID"))?;

        let user = self
            .users
            .token_access(id, &req.token)
            .await
            .map_err(map_status)?;

        debug!(user_id = %user.id, "Authorized over gRPC");

        Ok(Response::new(AuthReply {
            authorization: 1,
            user: Some(authpb::User {
                id: user.id.to_string(),
                username: user.username,
                first_name: user.first_name,
                last_name: user.last_name,
                email: user.email,
                phone: user.phone,
                language: user.language,
            }),
        }))
    }
}

/// Maps service error kinds to gRPC statuses
fn map_status(err: ServiceError) -> Status {
    match err {
        ServiceError::InvalidAuthentication => Status::unauthenticated(err.to_string()),
        ServiceError::NotFound { .. } => Status::not_found(err.to_string()),
        other => {
            tracing::error!("gRPC auth failed: {}", other);
            Status::internal("internal error")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn test_auth_failures_are_unauthenticated() {
        let status = map_status(ServiceError::InvalidAuthentication);
        assert_eq!(status.code(), Code::Unauthenticated);
    }

    #[test]
    fn test_missing_user_is_not_found() {
        let status = map_status(ServiceError::NotFound { id: Uuid::nil() });
        assert_eq!(status.code(), Code::NotFound);
    }

    #[test]
    fn test_infrastructure_errors_are_masked() {
        let status = map_status(ServiceError::Repo(sqlx::Error::PoolTimedOut));
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), "internal error");
    }
}
