#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::too_many_lines,
        clippy::items_after_statements
    )
)]

//! Quote Producer - Streaming Ingestion (publish side)
//!
//! Fetches one quote snapshot per tracked symbol from the Finnhub HTTP API
//! on a fixed cadence and publishes each record to a Kafka topic, waiting
//! for full-replica acknowledgment (`acks=all`) before moving on.
//!
//! # Data Flow
//!
//! ```text
//! Finnhub HTTP API ──► QuoteFetcher ──► publish cycle ──► Kafka topic
//!                       (per symbol)    (acks=all)
//! ```
//!
//! Startup order: connect (with retry while the broker is still coming up),
//! provision the topic idempotently, then loop forever. A fetch failure is
//! isolated to its symbol and cycle; a publish failure after startup is
//! fatal and exits the process.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Broker connection, startup retry guard, and topic provisioning.
pub mod broker;

/// Environment-based configuration.
pub mod config;

/// Top-level error type.
pub mod error;

/// HTTP quote fetcher.
pub mod fetch;

/// The publish cycle and run loop.
pub mod publish;

/// Quote record representation and field injection.
pub mod record;

/// Fixed-backoff retry policy for the startup connection guard.
pub mod retry;

/// Record sink port and Kafka implementation.
pub mod sink;

pub use config::{ConfigError, ProducerConfig};
pub use error::ProducerError;
pub use fetch::{FetchError, QuoteFetcher};
pub use record::QuoteRecord;
pub use retry::RetryPolicy;
pub use sink::{KafkaSink, MemorySink, PublishError, RecordSink};
