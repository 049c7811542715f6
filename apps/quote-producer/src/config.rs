//! Producer Configuration
//!
//! Configuration for the quote producer, loaded from environment variables.
//! There are no command-line flags; a `.env` file is honored when present.

use std::time::Duration;

/// Finnhub API credential.
#[derive(Clone)]
pub struct ApiToken(String);

impl ApiToken {
    /// Create a new token.
    #[must_use]
    pub const fn new(token: String) -> Self {
        Self(token)
    }

    /// Get the token value for request building.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiToken").field(&"[REDACTED]").finish()
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

/// Destination topic settings.
#[derive(Debug, Clone)]
pub struct TopicSettings {
    /// Topic name.
    pub name: String,
    /// Partition count used when the topic has to be created.
    pub partitions: i32,
    /// Replication factor used when the topic has to be created.
    pub replication: i32,
}

impl Default for TopicSettings {
    fn default() -> Self {
        Self {
            name: "Stock".to_string(),
            partitions: 3,
            replication: 1,
        }
    }
}

/// Complete producer configuration.
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    /// Quote API base URL.
    pub api_url: String,
    /// Quote API credential.
    pub api_token: ApiToken,
    /// Tracked symbols, fetched in order each cycle.
    pub symbols: Vec<String>,
    /// Kafka bootstrap servers.
    pub brokers: String,
    /// Destination topic.
    pub topic: TopicSettings,
    /// Delay between fetch cycles.
    pub fetch_interval: Duration,
    /// Connection guard retry settings.
    pub retry: RetrySettings,
}

/// Default quote API endpoint.
const DEFAULT_API_URL: &str = "https://finnhub.io/api/v1/quote";

/// Default symbol list.
const DEFAULT_SYMBOLS: &str = "AAPL,MSFT,TSLA,GOOGL,AMZN";

impl ProducerConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_token = std::env::var("FINNHUB_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("FINNHUB_TOKEN".to_string()))?;

        if api_token.is_empty() {
            return Err(ConfigError::EmptyValue("FINNHUB_TOKEN".to_string()));
        }

        let api_url =
            std::env::var("QUOTE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let symbols = std::env::var("QUOTE_SYMBOLS")
            .unwrap_or_else(|_| DEFAULT_SYMBOLS.to_string());
        let symbols = parse_symbols(&symbols);
        if symbols.is_empty() {
            return Err(ConfigError::EmptyValue("QUOTE_SYMBOLS".to_string()));
        }

        let brokers =
            std::env::var("KAFKA_BROKERS").unwrap_or_else(|_| "localhost:29092".to_string());

        let topic = TopicSettings {
            name: std::env::var("QUOTE_TOPIC")
                .unwrap_or_else(|_| TopicSettings::default().name),
            ..TopicSettings::default()
        };

        let fetch_interval =
            parse_env_duration_secs("FETCH_INTERVAL_SECS", Duration::from_secs(6));

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
            api_url,
            api_token: ApiToken::new(api_token),
            symbols,
            brokers,
            topic,
            fetch_interval,
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

/// Split a comma-separated symbol list, dropping empty entries.
fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
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
