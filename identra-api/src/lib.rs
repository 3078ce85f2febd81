//! # Identra API Server Library
//!
//! Core functionality for the Identra user-management server.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `response`: Uniform response envelope and pagination metadata
//! - `routes`: HTTP route handlers
//! - `grpc`: gRPC token-check service

pub mod app;
pub mod config;
pub mod error;
pub mod grpc;
pub mod response;
pub mod routes;
