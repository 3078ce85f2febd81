/// Configuration management for the Identra server
///
/// Loads configuration from environment variables once at startup into a
/// typed struct. Missing or malformed required values are fatal here, not
/// runtime errors.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `HTTP_HOST`: host to bind to (default: 0.0.0.0)
/// - `HTTP_PORT`: HTTP port (default: 8080)
/// - `GRPC_PORT`: gRPC port (default: 50051)
/// - `JWT_SECRET`: token signing key, at least 32 characters (required)
/// - `SEAL_KEY`: optional 64-hex-char AES-256 key for token sealing
/// - `PAGINATION_LIMIT`: default page size (default: 10)
/// - `CORS_ORIGINS`: comma-separated allowed origins (default: *)
/// - `RUST_LOG`: log filter (default: info)

use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub http: HttpConfig,

    /// gRPC server configuration
    pub grpc: GrpcConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Token configuration
    pub token: TokenConfig,

    /// Default page size when a request doesn't set a limit
    pub pagination_limit: i64,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; "*" means permissive
    pub cors_origins: Vec<String>,
}

/// gRPC server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrpcConfig {
    /// Port to bind to (same host as HTTP)
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Secret key for token signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub jwt_secret: String,

    /// Optional hex-encoded AES-256 key; when set, issued tokens are
    /// sealed for transport opacity
    pub seal_key: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or any value is
    /// malformed; the caller exits on error.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let http_host = env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let http_port = env::var("HTTP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;
        let grpc_port = env::var("GRPC_PORT")
            .unwrap_or_else(|_| "50051".to_string())
            .parse::<u16>()?;

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let seal_key = match env::var("SEAL_KEY") {
            Ok(key) => {
                let bytes = hex::decode(&key)
                    .map_err(|_| anyhow::anyhow!("SEAL_KEY must be hex encoded"))?;
                if bytes.len() != 32 {
                    anyhow::bail!("SEAL_KEY must be 32 bytes (64 hex characters)");
                }
                Some(key)
            }
            Err(_) => None,
        };

        let pagination_limit = env::var("PAGINATION_LIMIT")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<i64>()?;

        if pagination_limit <= 0 {
            anyhow::bail!("PAGINATION_LIMIT must be positive");
        }

        Ok(Self {
            http: HttpConfig {
                host: http_host,
                port: http_port,
                cors_origins,
            },
            grpc: GrpcConfig { port: grpc_port },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            token: TokenConfig {
                jwt_secret,
                seal_key,
            },
            pagination_limit,
        })
    }

    /// Returns the HTTP bind address
    pub fn http_address(&self) -> String {
        format!("{}:{}", self.http.host, self.http.port)
    }

    /// Returns the gRPC bind address
    pub fn grpc_address(&self) -> String {
        format!("{}:{}", self.http.host, self.grpc.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            http: HttpConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
            },
            grpc: GrpcConfig { port: 50051 },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
            },
            token: TokenConfig {
                jwt_secret: "test-secret-key-at-least-32-bytes-long".to_string(),
                seal_key: None,
            },
            pagination_limit: 10,
        }
    }

    #[test]
    fn test_bind_addresses() {
        let config = test_config();
        assert_eq!(config.http_address(), "127.0.0.1:8080");
        assert_eq!(config.grpc_address(), "127.0.0.1:50051");
    }
}
