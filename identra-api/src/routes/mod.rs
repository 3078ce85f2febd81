/// HTTP route handlers
///
/// - `health`: liveness check
/// - `users`: user CRUD, login, token access
/// - `roles`: per-application role management

pub mod health;
pub mod roles;
pub mod users;
