//! # Identra Shared Library
//!
//! This crate contains the domain types, authentication primitives, and
//! business logic shared by the Identra HTTP and gRPC servers.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their CRUD operations
//! - `auth`: Password hashing, token codec, and token sealing
//! - `service`: User and role services orchestrating auth + persistence
//! - `db`: Connection pool and migration helpers

pub mod auth;
pub mod db;
pub mod models;
pub mod service;

/// Current version of the Identra shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
