/// Database models for Identra
///
/// This module contains the persistent records and their CRUD operations.
/// The service layer in [`crate::service`] owns validation and
/// orchestration; functions here map directly onto SQL.
///
/// # Models
///
/// - `user`: user accounts with hashed credentials
/// - `role`: per-application role bitmasks owned by a user

pub mod role;
pub mod user;
