//! Archiver Error Types

use rdkafka::error::KafkaError;

use crate::config::ConfigError;
use crate::store::StoreError;

/// Top-level archiver error. Anything that reaches `main` through this type
/// terminates the process with a non-zero exit.
#[derive(Debug, thiserror::Error)]
pub enum ArchiverError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Kafka client could not be constructed, or a receive failed.
    #[error("kafka client error: {0}")]
    Kafka(#[from] KafkaError),

    /// The bounded connection guard ran out of attempts before the broker
    /// became reachable.
    #[error("broker unreachable after {attempts} attempts: {source}")]
    BrokerUnavailable {
        /// Probe attempts made before giving up.
        attempts: u32,
        /// The last probe failure.
        #[source]
        source: KafkaError,
    },

    /// A consumed record was not valid JSON. Fatal after startup.
    #[error("record payload is not valid JSON: {0}")]
    Payload(#[from] serde_json::Error),

    /// A consumed record carried no payload at all.
    #[error("record has no payload")]
    EmptyPayload,

    /// Object storage failed. Fatal after startup.
    #[error(transparent)]
    Store(#[from] StoreError),
}
