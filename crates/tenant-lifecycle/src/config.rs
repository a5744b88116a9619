//! Service configuration.
//!
//! Loaded from environment variables with defaults suitable for local
//! development. Only the JWT signing secret is required.

use std::time::Duration;

use tenant_auth::{JwtAlgorithm, JwtConfig};
use tenant_store::StoreConfig;
use thiserror::Error;

use crate::retry::RetryConfig;

/// Longest accepted token validity window (one year).
pub const MAX_ACCESS_TOKEN_MINUTES: i64 = 365 * 24 * 60;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Missing required environment variable.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Timeout and retry policy for lifecycle sagas.
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleConfig {
    /// Upper bound on any single store step.
    pub step_timeout: Duration,

    /// Retries for the registry update that follows a physical rename.
    pub metadata_retry: RetryConfig,

    /// Retries for compensating deletes and delete cleanup.
    pub compensation_retry: RetryConfig,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            step_timeout: Duration::from_millis(5000),
            metadata_retry: RetryConfig::with_attempts(3),
            compensation_retry: RetryConfig::with_attempts(3),
        }
    }
}

/// Full configuration of a tenant service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Store connection.
    pub store: StoreConfig,

    /// Token signing and validation.
    pub jwt: JwtConfig,

    /// Saga timeouts and retries.
    pub lifecycle: LifecycleConfig,
}

impl ServiceConfig {
    /// Configuration with defaults and the given signing secret.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            store: StoreConfig::default(),
            jwt: JwtConfig {
                secret: Some(secret.into()),
                ..JwtConfig::default()
            },
            lifecycle: LifecycleConfig::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `STORE_URI`: Store connection string (default: memory://localhost)
    /// - `MASTER_DB`: Master database name (default: master_db)
    /// - `JWT_SECRET`: HMAC signing secret (required)
    /// - `JWT_ALGORITHM`: HS256, HS384 or HS512 (default: HS256)
    /// - `JWT_ISSUER`: Token issuer (default: tenant-platform)
    /// - `ACCESS_TOKEN_EXPIRE_MINUTES`: Token validity window (default: 1440)
    /// - `LIFECYCLE_STEP_TIMEOUT_MS`: Per-step timeout (default: 5000)
    /// - `LIFECYCLE_METADATA_RETRY_ATTEMPTS`: Rename metadata attempts (default: 3)
    /// - `LIFECYCLE_COMPENSATION_RETRY_ATTEMPTS`: Rollback attempts (default: 3)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through a lookup function.
    ///
    /// Same keys and defaults as [`ServiceConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_store = StoreConfig::default();
        let default_jwt = JwtConfig::default();
        let default_lifecycle = LifecycleConfig::default();

        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?;

        let algorithm = match lookup("JWT_ALGORITHM") {
            Some(raw) => JwtAlgorithm::parse(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: "JWT_ALGORITHM".to_string(),
                message: format!("unsupported algorithm {raw:?}; expected HS256, HS384 or HS512"),
            })?,
            None => default_jwt.algorithm,
        };

        let expire_minutes: i64 = parse_or(
            &lookup,
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            default_jwt.access_token_duration.num_minutes(),
        )?;
        if !(1..=MAX_ACCESS_TOKEN_MINUTES).contains(&expire_minutes) {
            return Err(ConfigError::InvalidValue {
                key: "ACCESS_TOKEN_EXPIRE_MINUTES".to_string(),
                message: format!("must be between 1 and {MAX_ACCESS_TOKEN_MINUTES}"),
            });
        }
        let access_token_duration = chrono::Duration::try_minutes(expire_minutes).ok_or_else(|| {
            ConfigError::InvalidValue {
                key: "ACCESS_TOKEN_EXPIRE_MINUTES".to_string(),
                message: "out of range".to_string(),
            }
        })?;

        let step_timeout_ms: u64 = parse_or(
            &lookup,
            "LIFECYCLE_STEP_TIMEOUT_MS",
            default_lifecycle.step_timeout.as_millis() as u64,
        )?;
        let metadata_attempts: u32 = parse_or(
            &lookup,
            "LIFECYCLE_METADATA_RETRY_ATTEMPTS",
            default_lifecycle.metadata_retry.max_attempts,
        )?;
        let compensation_attempts: u32 = parse_or(
            &lookup,
            "LIFECYCLE_COMPENSATION_RETRY_ATTEMPTS",
            default_lifecycle.compensation_retry.max_attempts,
        )?;

        Ok(Self {
            store: StoreConfig {
                uri: lookup("STORE_URI").unwrap_or(default_store.uri),
                database: lookup("MASTER_DB").unwrap_or(default_store.database),
            },
            jwt: JwtConfig {
                secret: Some(secret),
                algorithm,
                issuer: lookup("JWT_ISSUER").unwrap_or(default_jwt.issuer),
                audience: default_jwt.audience,
                access_token_duration,
            },
            lifecycle: LifecycleConfig {
                step_timeout: Duration::from_millis(step_timeout_ms),
                metadata_retry: RetryConfig::with_attempts(metadata_attempts),
                compensation_retry: RetryConfig::with_attempts(compensation_attempts),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}
