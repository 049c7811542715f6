//! Broker Connection
//!
//! Consumer construction and the startup connection guard. Like the
//! producer's guard, this probes broker reachability with a metadata fetch
//! and retries under the configured [`RetryPolicy`]; a ready consumer is
//! handed back only once the broker answers.

use std::time::Duration;

use rdkafka::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::KafkaError;

use crate::config::ArchiverConfig;
use crate::error::ArchiverError;
use crate::retry::RetryPolicy;

/// How long a single reachability probe waits for broker metadata.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Create the Kafka consumer.
///
/// Offset reset `earliest`: on first join the group reads from the start of
/// the retained log. Auto-commit is enabled; see the crate docs for the
/// resulting at-most-once semantics.
///
/// # Errors
///
/// Returns an error if the client configuration is rejected.
pub fn create_consumer(config: &ArchiverConfig) -> Result<StreamConsumer, KafkaError> {
    ClientConfig::new()
        .set("bootstrap.servers", &config.brokers)
        .set("group.id", &config.group_id)
        .set("auto.offset.reset", "earliest")
        .set("enable.auto.commit", "true")
        .create()
}

/// Block until the broker behind `consumer` is reachable.
///
/// # Errors
///
/// Returns [`ArchiverError::BrokerUnavailable`] if a bounded policy runs out
/// of attempts. With the default unbounded policy this waits indefinitely.
pub async fn wait_for_broker(
    consumer: &StreamConsumer,
    policy: RetryPolicy,
) -> Result<(), ArchiverError> {
    wait_until_reachable(policy, || {
        consumer.fetch_metadata(None, PROBE_TIMEOUT).map(|_| ())
    })
    .await
}

/// Retry `probe` under `policy` until it succeeds.
///
/// Any probe error retries; the guard does not distinguish failure causes
/// (uniform policy, matching the producer side).
///
/// # Errors
///
/// Returns [`ArchiverError::BrokerUnavailable`] once the policy is
/// exhausted, carrying the last probe failure.
pub async fn wait_until_reachable<F>(
    mut policy: RetryPolicy,
    mut probe: F,
) -> Result<(), ArchiverError>
where
    F: FnMut() -> Result<(), KafkaError>,
{
    loop {
        match probe() {
            Ok(()) => return Ok(()),
            Err(err) => match policy.next_delay() {
                Some(backoff) => {
                    tracing::warn!(
                        error = %err,
                        backoff_secs = backoff.as_secs(),
                        attempt = policy.attempt_count(),
                        "broker not ready, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                None => {
                    return Err(ArchiverError::BrokerUnavailable {
                        attempts: policy.attempt_count(),
                        source: err,
                    });
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdkafka::types::RDKafkaErrorCode;
    use std::time::Duration;

    fn broker_down() -> KafkaError {
        KafkaError::MetadataFetch(RDKafkaErrorCode::AllBrokersDown)
    }

    #[tokio::test(start_paused = true)]
    async fn guard_succeeds_once_broker_appears() {
        let mut remaining_failures = 2;
        let result = wait_until_reachable(RetryPolicy::new(Duration::from_secs(5), 0), || {
            if remaining_failures > 0 {
                remaining_failures -= 1;
                Err(broker_down())
            } else {
                Ok(())
            }
        })
        .await;

        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_guard_reports_attempts_made() {
        let result =
            wait_until_reachable(RetryPolicy::new(Duration::from_secs(5), 3), || {
                Err(broker_down())
            })
            .await;

        match result {
            Err(ArchiverError::BrokerUnavailable { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected BrokerUnavailable, got {other:?}"),
        }
    }
}
