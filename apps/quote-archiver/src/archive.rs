//! Subscriber Loop
//!
//! The archiver's Running state: receive the next record from the topic,
//! deserialize it, derive its storage key, write it as an object, log the
//! write. No explicit offset commit happens here; advancement is
//! auto-commit, decoupled from storage-write success (see the crate docs
//! for the at-most-once consequence). Receive, deserialize, and store
//! failures propagate and end the loop.

use rdkafka::Message;
use rdkafka::consumer::StreamConsumer;
use tokio_util::sync::CancellationToken;

use crate::error::ArchiverError;
use crate::key::object_key;
use crate::store::{CONTENT_TYPE_JSON, ObjectStore};

/// Archive one record payload: deserialize, derive the key, store.
///
/// Returns the derived key. The stored body is the JSON-text encoding of
/// the full record, tagged `application/json`.
///
/// # Errors
///
/// Returns an error if the payload is not valid JSON or the write fails.
pub async fn archive_payload<S: ObjectStore>(
    payload: &[u8],
    store: &S,
) -> Result<String, ArchiverError> {
    let record: serde_json::Value = serde_json::from_slice(payload)?;
    let key = object_key(&record, chrono::Utc::now().timestamp());
    let body = serde_json::to_vec(&record)?;
    store.put(&key, body, CONTENT_TYPE_JSON).await?;
    Ok(key)
}

/// Consume records and archive them until shutdown is requested.
///
/// The loop has no internal termination condition; it runs until the token
/// is cancelled (process signal) or a receive/archive step fails.
///
/// # Errors
///
/// Propagates the first receive, deserialization, or storage failure.
pub async fn run<S: ObjectStore>(
    consumer: &StreamConsumer,
    store: &S,
    shutdown: CancellationToken,
) -> Result<(), ArchiverError> {
    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                tracing::info!("shutdown requested, stopping subscriber loop");
                return Ok(());
            }
            received = consumer.recv() => {
                let message = received?;
                let payload = message.payload().ok_or(ArchiverError::EmptyPayload)?;
                let key = archive_payload(payload, store).await?;
                tracing::info!(
                    destination = %store.destination(&key),
                    partition = message.partition(),
                    offset = message.offset(),
                    "record archived"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn archives_record_under_derived_key() {
        let store = MemoryStore::new();
        let payload =
            serde_json::to_vec(&json!({"symbol": "AAPL", "fetched_at": 1_700_000_000, "c": 189.5}))
                .unwrap();

        let key = archive_payload(&payload, &store).await.unwrap();

        assert_eq!(key, "AAPL/1700000000.json");
        let body: serde_json::Value =
            serde_json::from_slice(&store.get(&key).unwrap()).unwrap();
        assert_eq!(body["c"], 189.5);
        assert_eq!(
            store.content_type(&key),
            Some(CONTENT_TYPE_JSON.to_string())
        );
    }

    #[tokio::test]
    async fn record_without_symbol_lands_under_unknown_prefix() {
        let store = MemoryStore::new();
        let payload = serde_json::to_vec(&json!({"fetched_at": 77, "c": 1.0})).unwrap();

        let key = archive_payload(&payload, &store).await.unwrap();

        assert_eq!(key, "unknown/77.json");
    }

    #[tokio::test]
    async fn record_without_fetched_at_uses_current_time() {
        let store = MemoryStore::new();
        let payload = serde_json::to_vec(&json!({"symbol": "AAPL", "c": 1.0})).unwrap();

        let before = chrono::Utc::now().timestamp();
        let key = archive_payload(&payload, &store).await.unwrap();
        let after = chrono::Utc::now().timestamp();

        let ts: i64 = key
            .strip_prefix("AAPL/")
            .and_then(|rest| rest.strip_suffix(".json"))
            .and_then(|ts| ts.parse().ok())
            .unwrap();
        assert!(ts >= before && ts <= after, "key timestamp {ts} outside [{before}, {after}]");
    }

    #[tokio::test]
    async fn invalid_json_payload_is_an_error() {
        let store = MemoryStore::new();
        let result = archive_payload(b"not json", &store).await;
        assert!(matches!(result, Err(ArchiverError::Payload(_))));
        assert!(store.keys().is_empty());
    }

    #[tokio::test]
    async fn colliding_keys_overwrite() {
        let store = MemoryStore::new();
        let first =
            serde_json::to_vec(&json!({"symbol": "TSLA", "fetched_at": 9, "c": 1.0})).unwrap();
        let second =
            serde_json::to_vec(&json!({"symbol": "TSLA", "fetched_at": 9, "c": 2.0})).unwrap();

        archive_payload(&first, &store).await.unwrap();
        archive_payload(&second, &store).await.unwrap();

        assert_eq!(store.keys(), vec!["TSLA/9.json"]);
        let body: serde_json::Value =
            serde_json::from_slice(&store.get("TSLA/9.json").unwrap()).unwrap();
        assert_eq!(body["c"], 2.0);
    }
}
