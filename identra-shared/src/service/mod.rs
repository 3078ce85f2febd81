/// Business services for Identra
///
/// Services orchestrate the auth primitives and the model layer and own
/// all validation. Transports (HTTP and gRPC) call services and map
/// [`error::ServiceError`] kinds onto wire statuses; they never interpret
/// repository errors themselves.

pub mod error;
pub mod role;
pub mod user;

pub use error::ServiceError;
pub use role::RoleService;
pub use user::UserService;
