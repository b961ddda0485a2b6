/// Configuration management for the API server
///
/// Loads configuration from environment variables into a type-safe struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `API_HOST`: host to bind to (default: 0.0.0.0)
/// - `API_PORT`: port to bind to (default: 8080)
/// - `MAX_TOPIC_LENGTH`: submission topic ceiling in characters (default: 200)
/// - `EXECUTOR_WORKERS`: concurrent generation workers (default: 5)
/// - `PIPELINE_TIMEOUT_SECONDS`: bound on one generation run (default: 1800)
/// - `SUBMIT_RATE_LIMIT_PER_HOUR`: per-IP submissions per hour (default: 10)
/// - `ADMIN_TOKEN`: bearer token for the reporting endpoints (unset =
///   reporting disabled)
/// - `RUST_LOG`: log filter (default: info)
///
/// # Example
///
/// ```no_run
/// use draftmill_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Admission configuration
    pub admission: AdmissionConfig,

    /// Executor pool configuration
    pub executor: ExecutorConfig,

    /// Per-IP rate limiting on the submit path
    pub rate_limit: RateLimitConfig,

    /// Admin access configuration
    pub admin: AdminConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
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

/// Admission configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionConfig {
    /// Maximum topic length in characters
    pub max_topic_length: usize,
}

/// Executor pool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Number of concurrent generation workers
    pub workers: usize,

    /// Upper bound on a single pipeline run, in seconds
    pub pipeline_timeout_seconds: u64,
}

/// Per-IP rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Submissions allowed per IP per hour
    pub submit_per_hour: u32,
}

/// Admin access configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Bearer token required by the reporting endpoints
    ///
    /// When unset the endpoints answer 503 rather than running open.
    pub token: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or any variable has an
    /// unparseable value.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let max_topic_length = env::var("MAX_TOPIC_LENGTH")
            .unwrap_or_else(|_| "200".to_string())
            .parse::<usize>()?;

        let workers = env::var("EXECUTOR_WORKERS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<usize>()?;

        if workers == 0 {
            anyhow::bail!("EXECUTOR_WORKERS must be at least 1");
        }

        let pipeline_timeout_seconds = env::var("PIPELINE_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "1800".to_string())
            .parse::<u64>()?;

        let submit_per_hour = env::var("SUBMIT_RATE_LIMIT_PER_HOUR")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let admin_token = env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty());

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            admission: AdmissionConfig { max_topic_length },
            executor: ExecutorConfig {
                workers,
                pipeline_timeout_seconds,
            },
            rate_limit: RateLimitConfig { submit_per_hour },
            admin: AdminConfig { token: admin_token },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
            },
            admission: AdmissionConfig {
                max_topic_length: 200,
            },
            executor: ExecutorConfig {
                workers: 5,
                pipeline_timeout_seconds: 1800,
            },
            rate_limit: RateLimitConfig { submit_per_hour: 10 },
            admin: AdminConfig { token: None },
        }
    }

    #[test]
    fn test_bind_address() {
        let config = test_config();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }
}
