//! Quote Producer Binary
//!
//! Fetches quote snapshots per symbol on a fixed cadence and publishes them
//! to the Kafka topic, waiting for full-replica acknowledgment per record.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin quote-producer
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `FINNHUB_TOKEN`: Quote API credential
//!
//! ## Optional
//! - `QUOTE_API_URL`: Quote API base URL (default: <https://finnhub.io/api/v1/quote>)
//! - `QUOTE_SYMBOLS`: Comma-separated symbol list (default: AAPL,MSFT,TSLA,GOOGL,AMZN)
//! - `KAFKA_BROKERS`: Kafka bootstrap servers (default: localhost:29092)
//! - `QUOTE_TOPIC`: Destination topic (default: Stock)
//! - `FETCH_INTERVAL_SECS`: Delay between fetch cycles (default: 6)
//! - `BROKER_RETRY_BACKOFF_SECS`: Connection guard backoff (default: 5)
//! - `BROKER_RETRY_MAX_ATTEMPTS`: Connection guard bound, 0 = unlimited (default: 0)
//! - `RUST_LOG`: Log level (default: info)

use std::time::Duration;

use quote_producer::{KafkaSink, ProducerConfig, QuoteFetcher, broker, publish};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// How long to wait for in-flight messages when shutting down.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting quote producer");

    let config = ProducerConfig::from_env()?;
    log_config(&config);

    // Connecting: the guard retries while the broker is still coming up and
    // hands back a ready producer only on success.
    let producer = broker::create_producer(&config.brokers)?;
    broker::wait_for_broker(&producer, &config.retry).await?;
    tracing::info!(brokers = %config.brokers, "connected to Kafka broker");

    // Provisioning: idempotent, non-fatal on failure.
    let admin = broker::create_admin(&config.brokers)?;
    broker::ensure_topic(&admin, &config.topic).await;

    let fetcher = QuoteFetcher::new(config.api_url.clone(), config.api_token.clone());
    let sink = KafkaSink::new(producer, config.topic.name.clone());

    let shutdown = CancellationToken::new();
    tokio::spawn(await_shutdown(shutdown.clone()));

    // Running: loops until a signal arrives or a publish fails.
    publish::run(
        &fetcher,
        &sink,
        &config.symbols,
        config.fetch_interval,
        shutdown,
    )
    .await?;

    if let Err(err) = sink.flush(FLUSH_TIMEOUT) {
        tracing::warn!(error = %err, "failed to flush in-flight messages");
    }

    tracing::info!("Quote producer stopped");
    Ok(())
}

/// Log the parsed configuration.
fn log_config(config: &ProducerConfig) {
    tracing::info!(
        api_url = %config.api_url,
        symbols = ?config.symbols,
        brokers = %config.brokers,
        topic = %config.topic.name,
        fetch_interval_secs = config.fetch_interval.as_secs(),
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
