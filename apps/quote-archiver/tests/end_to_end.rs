//! End-to-End Pipeline Test
//!
//! Runs a full producer fetch cycle against a mocked quote API into an
//! in-memory sink, then replays the published payloads through the
//! archiver's record handler into an in-memory store. This is the whole
//! pipeline minus the broker and the bucket, which only carry bytes between
//! the two halves.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use quote_archiver::store::{CONTENT_TYPE_JSON, MemoryStore};
use quote_archiver::{ArchiverError, archive_payload};
use quote_producer::config::ApiToken;
use quote_producer::sink::MemorySink;
use quote_producer::{QuoteFetcher, publish};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn publish_then_consume_yields_one_object_per_symbol() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/quote"))
        .and(query_param("symbol", "AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "c": 189.5, "h": 190.1, "l": 188.2, "o": 189.0, "pc": 188.9
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/quote"))
        .and(query_param("symbol", "MSFT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "c": 425.1, "h": 426.0, "l": 424.2, "o": 425.0, "pc": 424.8
        })))
        .mount(&server)
        .await;

    let fetcher = QuoteFetcher::new(
        format!("{}/quote", server.uri()),
        ApiToken::new("test-token".to_string()),
    );
    let sink = MemorySink::new();
    let symbols = vec!["AAPL".to_string(), "MSFT".to_string()];

    // Publish side: one cycle over both symbols.
    let published = publish::run_cycle(&fetcher, &sink, &symbols).await.unwrap();
    assert_eq!(published, 2);

    // Consume side: replay the published payloads through the archiver.
    let store = MemoryStore::new();
    for (_, payload) in sink.published() {
        archive_payload(payload.as_bytes(), &store).await.unwrap();
    }

    let keys = store.keys();
    assert_eq!(keys.len(), 2, "expected exactly two stored objects");

    for (symbol, close) in [("AAPL", 189.5), ("MSFT", 425.1)] {
        let key = keys
            .iter()
            .find(|k| k.starts_with(&format!("{symbol}/")))
            .unwrap_or_else(|| panic!("no object stored for {symbol}"));
        assert!(key.ends_with(".json"));

        let body: serde_json::Value = serde_json::from_slice(&store.get(key).unwrap()).unwrap();

        // Injected fields present and consistent with the key.
        assert_eq!(body["symbol"], symbol);
        let fetched_at = body["fetched_at"].as_i64().unwrap();
        assert_eq!(*key, format!("{symbol}/{fetched_at}.json"));

        // Upstream fields pass through unmodified.
        assert_eq!(body["c"], close);
        assert!(body["h"].is_number());
        assert!(body["pc"].is_number());

        assert_eq!(store.content_type(key), Some(CONTENT_TYPE_JSON.to_string()));
    }
}

#[tokio::test]
async fn consume_side_tolerates_foreign_records() {
    // A record that did not come from this producer (no injected fields)
    // still lands in the store instead of crashing the loop body.
    let store = MemoryStore::new();
    let payload = serde_json::to_vec(&json!({"price": 10.5})).unwrap();

    let key = archive_payload(&payload, &store).await.unwrap();

    assert!(key.starts_with("unknown/"));
    assert!(key.ends_with(".json"));
}

#[tokio::test]
async fn consume_side_rejects_non_json_payloads() {
    let store = MemoryStore::new();
    let result = archive_payload(b"\x00\x01\x02", &store).await;
    assert!(matches!(result, Err(ArchiverError::Payload(_))));
}
