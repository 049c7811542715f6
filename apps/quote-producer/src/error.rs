//! Producer Error Types

use rdkafka::error::KafkaError;

use crate::config::ConfigError;
use crate::sink::PublishError;

/// Top-level producer error. Anything that reaches `main` through this type
/// terminates the process with a non-zero exit.
#[derive(Debug, thiserror::Error)]
pub enum ProducerError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Kafka client could not be constructed.
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

    /// A record could not be published. Fatal after startup.
    #[error(transparent)]
    Publish(#[from] PublishError),
}
