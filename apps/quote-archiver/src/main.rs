//! Quote Archiver Binary
//!
//! Consumes quote records from the Kafka topic and archives each one to
//! S3-compatible object storage under a `{symbol}/{fetched_at}.json` key.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin quote-archiver
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `S3_ACCESS_KEY`: Object store access key
//! - `S3_SECRET_KEY`: Object store secret key
//!
//! ## Optional
//! - `KAFKA_BROKERS`: Kafka bootstrap servers (default: localhost:29092)
//! - `QUOTE_TOPIC`: Source topic (default: Stock)
//! - `CONSUMER_GROUP_ID`: Consumer group (default: bronze-consumer)
//! - `S3_ENDPOINT`: Object store endpoint (default: <http://localhost:9002>)
//! - `S3_REGION`: Region name (default: us-east-1)
//! - `S3_BUCKET`: Destination bucket (default: bronze-transactions)
//! - `BROKER_RETRY_BACKOFF_SECS`: Connection guard backoff (default: 5)
//! - `BROKER_RETRY_MAX_ATTEMPTS`: Connection guard bound, 0 = unlimited (default: 0)
//! - `RUST_LOG`: Log level (default: info)

use quote_archiver::{ArchiverConfig, RetryPolicy, S3Store, archive, broker, store};
use rdkafka::consumer::Consumer;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting quote archiver");

    let config = ArchiverConfig::from_env()?;
    log_config(&config);

    // Provisioning: a confirmed-absent bucket is created; a failed probe is
    // a startup error, not an excuse to create blindly.
    let s3_client = store::create_client(&config.store);
    store::ensure_bucket(&s3_client, &config.store.bucket).await?;

    // Connecting: the guard retries while the broker is still coming up.
    let consumer = broker::create_consumer(&config)?;
    broker::wait_for_broker(&consumer, RetryPolicy::from(&config.retry)).await?;
    tracing::info!(brokers = %config.brokers, "connected to Kafka broker");

    consumer.subscribe(&[&config.topic])?;
    tracing::info!(topic = %config.topic, group = %config.group_id, "consumer streaming");

    let object_store = S3Store::new(s3_client, config.store.bucket.clone());

    let shutdown = CancellationToken::new();
    tokio::spawn(await_shutdown(shutdown.clone()));

    // Running: loops until a signal arrives or a receive/archive step fails.
    archive::run(&consumer, &object_store, shutdown).await?;

    tracing::info!("Quote archiver stopped");
    Ok(())
}

/// Log the parsed configuration.
fn log_config(config: &ArchiverConfig) {
    tracing::info!(
        brokers = %config.brokers,
        topic = %config.topic,
        group = %config.group_id,
        endpoint = %config.store.endpoint,
        bucket = %config.store.bucket,
        "Configuration loaded"
    );
}

/// Wait for SIGTERM or SIGINT, then cancel the token.
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown.cancel();
}
