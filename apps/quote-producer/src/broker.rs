//! Broker Connection and Topic Provisioning
//!
//! Client construction, the startup connection guard, and idempotent topic
//! creation. The guard probes broker reachability with a metadata fetch and
//! retries under the configured [`RetryPolicy`]; it returns an owned,
//! ready-to-use handle only on success (no shared nullable connection
//! state).

use std::time::Duration;

use rdkafka::ClientConfig;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, Producer};
use rdkafka::types::RDKafkaErrorCode;

use crate::config::{RetrySettings, TopicSettings};
use crate::error::ProducerError;
use crate::retry::RetryPolicy;

/// How long a single reachability probe waits for broker metadata.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// How long an enqueued message may wait for delivery before erroring.
const MESSAGE_TIMEOUT_MS: &str = "5000";

/// Create the Kafka producer.
///
/// `acks=all`: a send is acknowledged only once every replica has persisted
/// it, the strongest durability level the broker offers.
///
/// # Errors
///
/// Returns an error if the client configuration is rejected.
pub fn create_producer(brokers: &str) -> Result<FutureProducer, KafkaError> {
    ClientConfig::new()
        .set("bootstrap.servers", brokers)
        .set("message.timeout.ms", MESSAGE_TIMEOUT_MS)
        .set("acks", "all")
        .create()
}

/// Create the admin client used for topic provisioning.
///
/// # Errors
///
/// Returns an error if the client configuration is rejected.
pub fn create_admin(brokers: &str) -> Result<AdminClient<DefaultClientContext>, KafkaError> {
    ClientConfig::new()
        .set("bootstrap.servers", brokers)
        .create()
}

/// Block until the broker behind `producer` is reachable.
///
/// # Errors
///
/// Returns [`ProducerError::BrokerUnavailable`] if a bounded policy runs out
/// of attempts. With the default unbounded policy this waits indefinitely.
pub async fn wait_for_broker(
    producer: &FutureProducer,
    settings: &RetrySettings,
) -> Result<(), ProducerError> {
    let client = producer.client();
    wait_until_reachable(RetryPolicy::from(settings), || {
        client.fetch_metadata(None, PROBE_TIMEOUT).map(|_| ())
    })
    .await
}

/// Retry `probe` under `policy` until it succeeds.
///
/// The probe runs immediately; each failure consumes one policy attempt and
/// sleeps the fixed backoff before the next try. Any probe error retries:
/// the guard does not distinguish failure causes (uniform policy).
///
/// # Errors
///
/// Returns [`ProducerError::BrokerUnavailable`] once the policy is
/// exhausted, carrying the last probe failure.
pub async fn wait_until_reachable<F>(
    mut policy: RetryPolicy,
    mut probe: F,
) -> Result<(), ProducerError>
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
                    return Err(ProducerError::BrokerUnavailable {
                        attempts: policy.attempt_count(),
                        source: err,
                    });
                }
            },
        }
    }
}

/// Outcome of one topic-creation request.
#[derive(Debug, PartialEq, Eq)]
enum TopicOutcome {
    /// Topic was created.
    Created,
    /// Topic already existed; treated as success.
    AlreadyExists,
    /// Creation failed for another reason.
    Failed(RDKafkaErrorCode),
}

/// Classify a per-topic result from the admin create call.
fn topic_outcome(result: Result<String, (String, RDKafkaErrorCode)>) -> TopicOutcome {
    match result {
        Ok(_) => TopicOutcome::Created,
        Err((_, RDKafkaErrorCode::TopicAlreadyExists)) => TopicOutcome::AlreadyExists,
        Err((_, code)) => TopicOutcome::Failed(code),
    }
}

/// Idempotently ensure the destination topic exists.
///
/// "Already exists" is success. Any other provisioning failure is logged and
/// swallowed: the publisher proceeds regardless, since the topic may already
/// exist with adequate configuration even if creation raced another
/// instance.
pub async fn ensure_topic(admin: &AdminClient<DefaultClientContext>, topic: &TopicSettings) {
    let new_topic = NewTopic::new(
        &topic.name,
        topic.partitions,
        TopicReplication::Fixed(topic.replication),
    );

    match admin.create_topics([&new_topic], &AdminOptions::new()).await {
        Ok(results) => {
            for result in results {
                match topic_outcome(result) {
                    TopicOutcome::Created => {
                        tracing::info!(
                            topic = %topic.name,
                            partitions = topic.partitions,
                            "topic created"
                        );
                    }
                    TopicOutcome::AlreadyExists => {
                        tracing::info!(topic = %topic.name, "topic already exists");
                    }
                    TopicOutcome::Failed(code) => {
                        tracing::warn!(topic = %topic.name, error = %code, "topic creation failed");
                    }
                }
            }
        }
        Err(err) => {
            tracing::warn!(topic = %topic.name, error = %err, "topic provisioning request failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn broker_down() -> KafkaError {
        KafkaError::MetadataFetch(RDKafkaErrorCode::AllBrokersDown)
    }

    #[tokio::test(start_paused = true)]
    async fn guard_succeeds_after_n_failures() {
        let mut remaining_failures = 3;
        let policy = RetryPolicy::new(Duration::from_secs(5), 0);

        let result = wait_until_reachable(policy, || {
            if remaining_failures > 0 {
                remaining_failures -= 1;
                Err(broker_down())
            } else {
                Ok(())
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(remaining_failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn guard_makes_one_attempt_per_backoff_interval() {
        let backoff = Duration::from_secs(5);
        let start = tokio::time::Instant::now();
        let mut remaining_failures = 4;

        wait_until_reachable(RetryPolicy::new(backoff, 0), || {
            if remaining_failures > 0 {
                remaining_failures -= 1;
                Err(broker_down())
            } else {
                Ok(())
            }
        })
        .await
        .unwrap();

        // Four failures mean four backoff sleeps before the fifth probe.
        assert_eq!(start.elapsed(), backoff * 4);
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_guard_gives_up_with_last_error() {
        let policy = RetryPolicy::new(Duration::from_millis(10), 2);

        let result = wait_until_reachable(policy, || Err(broker_down())).await;

        match result {
            Err(ProducerError::BrokerUnavailable { attempts, .. }) => assert_eq!(attempts, 2),
            other => panic!("expected BrokerUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn already_exists_is_success() {
        let outcome = topic_outcome(Err((
            "Stock".to_string(),
            RDKafkaErrorCode::TopicAlreadyExists,
        )));
        assert_eq!(outcome, TopicOutcome::AlreadyExists);
    }

    #[test]
    fn created_topic_is_success() {
        assert_eq!(
            topic_outcome(Ok("Stock".to_string())),
            TopicOutcome::Created
        );
    }

    #[test]
    fn other_failures_are_classified_as_failed() {
        let outcome = topic_outcome(Err((
            "Stock".to_string(),
            RDKafkaErrorCode::InvalidReplicationFactor,
        )));
        assert_eq!(
            outcome,
            TopicOutcome::Failed(RDKafkaErrorCode::InvalidReplicationFactor)
        );
    }
}
