//! Publish Loop
//!
//! The producer's Running state: iterate the tracked symbols in order, fetch
//! each quote, publish it, sleep the cadence, repeat. Fetch failures are
//! isolated to their symbol; publish failures propagate and end the loop.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::ProducerError;
use crate::fetch::QuoteFetcher;
use crate::sink::RecordSink;

/// Run one fetch-and-publish cycle over the symbol list.
///
/// Returns the number of records published. A symbol whose fetch fails is
/// logged and skipped; the rest of the cycle continues.
///
/// # Errors
///
/// Returns an error if a publish fails. There is no per-record retry or
/// dead-letter path, so the caller treats this as fatal.
pub async fn run_cycle<S: RecordSink>(
    fetcher: &QuoteFetcher,
    sink: &S,
    symbols: &[String],
) -> Result<usize, ProducerError> {
    let mut published = 0;

    for symbol in symbols {
        match fetcher.fetch(symbol).await {
            Ok(record) => {
                tracing::info!(
                    symbol = %record.symbol(),
                    fetched_at = record.fetched_at(),
                    "publishing quote"
                );
                sink.publish(&record).await?;
                published += 1;
            }
            Err(err) => {
                tracing::warn!(symbol = %symbol, error = %err, "quote fetch failed, skipping");
            }
        }
    }

    Ok(published)
}

/// Run fetch-and-publish cycles until shutdown is requested.
///
/// The loop has no internal termination condition; it runs until the token
/// is cancelled (process signal) or a publish fails.
///
/// # Errors
///
/// Propagates the first publish failure.
pub async fn run<S: RecordSink>(
    fetcher: &QuoteFetcher,
    sink: &S,
    symbols: &[String],
    interval: Duration,
    shutdown: CancellationToken,
) -> Result<(), ProducerError> {
    loop {
        let published = run_cycle(fetcher, sink, symbols).await?;
        tracing::debug!(published, total = symbols.len(), "cycle complete");

        tokio::select! {
            () = shutdown.cancelled() => {
                tracing::info!("shutdown requested, stopping publish loop");
                return Ok(());
            }
            () = tokio::time::sleep(interval) => {}
        }
    }
}
