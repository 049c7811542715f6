//! Archiver Configuration
//!
//! Configuration for the quote archiver, loaded from environment variables.
//! There are no command-line flags; a `.env` file is honored when present.

use std::time::Duration;

/// Object store credentials.
#[derive(Clone)]
pub struct StoreCredentials {
    access_key: String,
    secret_key: String,
}

impl StoreCredentials {
    /// Create new credentials.
    #[must_use]
    pub const fn new(access_key: String, secret_key: String) -> Self {
        Self {
            access_key,
            secret_key,
        }
    }

    /// Get the access key.
    #[must_use]
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Get the secret key.
    #[must_use]
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }
}

impl std::fmt::Debug for StoreCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreCredentials")
            .field("access_key", &"[REDACTED]")
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

/// Startup retry settings for the broker connection guard.
#[derive(Debug, Clone)]
pub struct RetrySettings {
    /// Fixed delay between connection attempts.
    pub backoff: Duration,
    /// Maximum attempts before giving up (0 = unlimited).
    pub max_attempts: u32,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            backoff: Duration::from_secs(5),
            max_attempts: 0, // Unlimited: startup dependency wait
        }
    }
}

/// Object store connection settings.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// S3-compatible endpoint URL.
    pub endpoint: String,
    /// Region name (MinIO accepts any).
    pub region: String,
    /// Credentials.
    pub credentials: StoreCredentials,
    /// Destination bucket.
    pub bucket: String,
}

/// Complete archiver configuration.
#[derive(Debug, Clone)]
pub struct ArchiverConfig {
    /// Kafka bootstrap servers.
    pub brokers: String,
    /// Source topic.
    pub topic: String,
    /// Consumer group id.
    pub group_id: String,
    /// Object store settings.
    pub store: StoreSettings,
    /// Connection guard retry settings.
    pub retry: RetrySettings,
}

impl ArchiverConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let access_key = require_env("S3_ACCESS_KEY")?;
        let secret_key = require_env("S3_SECRET_KEY")?;

        let brokers =
            std::env::var("KAFKA_BROKERS").unwrap_or_else(|_| "localhost:29092".to_string());
        let topic = std::env::var("QUOTE_TOPIC").unwrap_or_else(|_| "Stock".to_string());
        let group_id =
            std::env::var("CONSUMER_GROUP_ID").unwrap_or_else(|_| "bronze-consumer".to_string());

        let store = StoreSettings {
            endpoint: std::env::var("S3_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:9002".to_string()),
            region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            credentials: StoreCredentials::new(access_key, secret_key),
            bucket: std::env::var("S3_BUCKET")
                .unwrap_or_else(|_| "bronze-transactions".to_string()),
        };

        let retry = RetrySettings {
            backoff: parse_env_duration_secs(
                "BROKER_RETRY_BACKOFF_SECS",
                RetrySettings::default().backoff,
            ),
            max_attempts: parse_env_u32(
                "BROKER_RETRY_MAX_ATTEMPTS",
                RetrySettings::default().max_attempts,
            ),
        };

        Ok(Self {
            brokers,
            topic,
            group_id,
            store,
            retry,
        })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
}

fn require_env(key: &str) -> Result<String, ConfigError> {
    let value =
        std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))?;
    if value.is_empty() {
        return Err(ConfigError::EmptyValue(key.to_string()));
    }
    Ok(value)
}

fn parse_env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_duration_secs(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}
