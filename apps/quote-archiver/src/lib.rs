#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::too_many_lines,
        clippy::items_after_statements
    )
)]

//! Quote Archiver - Streaming Ingestion (consume side)
//!
//! Pulls quote records from the Kafka topic as a member of a fixed consumer
//! group and writes each record to S3-compatible object storage under a
//! `{symbol}/{fetched_at}.json` key.
//!
//! # Data Flow
//!
//! ```text
//! Kafka topic ──► subscriber loop ──► object store (bronze bucket)
//!                  (earliest, auto-commit)
//! ```
//!
//! # Delivery Semantics
//!
//! Offsets advance by auto-commit, decoupled from storage-write success. A
//! crash between "offset committed" and "object durably stored" silently
//! drops that record: this is an accepted at-most-once property of the
//! pipeline, kept deliberately. Do not add an explicit commit here without
//! revisiting that decision end to end.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// The subscriber loop: deserialize, derive key, store.
pub mod archive;

/// Broker connection and the startup retry guard.
pub mod broker;

/// Environment-based configuration.
pub mod config;

/// Top-level error type.
pub mod error;

/// Storage key derivation.
pub mod key;

/// Fixed-backoff retry policy for the startup connection guard.
pub mod retry;

/// Object store port, S3 implementation, and bucket provisioning.
pub mod store;

pub use archive::archive_payload;
pub use config::{ArchiverConfig, ConfigError};
pub use error::ArchiverError;
pub use key::object_key;
pub use retry::RetryPolicy;
pub use store::{MemoryStore, ObjectStore, S3Store, StoreError};
