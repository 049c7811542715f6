//! Record Sink Port
//!
//! Seam between the publish cycle and the durable log. The production
//! implementation is a Kafka producer configured with `acks=all`: a publish
//! only returns once every replica has acknowledged the write, favoring
//! durability over latency.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;

use crate::record::QuoteRecord;

/// Publish failure. Fatal after startup: there is no retry or dead-letter
/// path for a record the broker refuses.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Record could not be serialized to the JSON payload.
    #[error("record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    /// Broker rejected the write or the delivery ack timed out.
    #[error("kafka publish failed: {0}")]
    Kafka(#[from] KafkaError),
}

/// Destination for fetched quote records.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Publish one record and wait for the sink's durability acknowledgment.
    async fn publish(&self, record: &QuoteRecord) -> Result<(), PublishError>;
}

/// Kafka-backed sink publishing JSON payloads keyed by symbol.
pub struct KafkaSink {
    producer: FutureProducer,
    topic: String,
}

/// How long to wait for a delivery acknowledgment before failing the send.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

impl KafkaSink {
    /// Create a sink publishing to the given topic.
    #[must_use]
    pub const fn new(producer: FutureProducer, topic: String) -> Self {
        Self { producer, topic }
    }

    /// Flush in-flight messages, e.g. before process exit.
    ///
    /// # Errors
    ///
    /// Returns an error if messages could not be flushed within the timeout.
    pub fn flush(&self, timeout: Duration) -> Result<(), KafkaError> {
        use rdkafka::producer::Producer;
        self.producer.flush(timeout)
    }
}

#[async_trait]
impl RecordSink for KafkaSink {
    async fn publish(&self, record: &QuoteRecord) -> Result<(), PublishError> {
        let payload = record.to_payload()?;
        let kafka_record = FutureRecord::to(&self.topic)
            .key(record.symbol())
            .payload(&payload);

        self.producer
            .send(kafka_record, Timeout::After(DELIVERY_TIMEOUT))
            .await
            .map_err(|(err, _message)| PublishError::Kafka(err))?;

        Ok(())
    }
}

/// In-memory sink collecting payloads, used by tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    published: Mutex<Vec<(String, String)>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Published (symbol, payload) pairs in publish order.
    ///
    /// # Panics
    ///
    /// Panics if the inner lock is poisoned.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn published(&self) -> Vec<(String, String)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    #[allow(clippy::unwrap_used)]
    async fn publish(&self, record: &QuoteRecord) -> Result<(), PublishError> {
        let payload = record.to_payload()?;
        self.published
            .lock()
            .unwrap()
            .push((record.symbol().to_string(), payload));
        Ok(())
    }
}
