//! Storage Key Derivation
//!
//! Object keys are `{symbol}/{fetched_at}.json`, derived deterministically
//! from the record. Distinct (symbol, fetched_at) pairs map to distinct
//! keys; identical pairs collide and the later write wins, an accepted
//! property, not one this system corrects.

use serde_json::Value;

/// Key prefix used when a record carries no `symbol` field.
pub const UNKNOWN_SYMBOL: &str = "unknown";

/// Derive the storage key for a record.
///
/// A record without a `symbol` string falls back to [`UNKNOWN_SYMBOL`]; a
/// record without an integer `fetched_at` falls back to `fallback_ts` (the
/// consumer's current time, not a fixed sentinel).
#[must_use]
pub fn object_key(record: &Value, fallback_ts: i64) -> String {
    let symbol = record
        .get("symbol")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_SYMBOL);
    let fetched_at = record
        .get("fetched_at")
        .and_then(Value::as_i64)
        .unwrap_or(fallback_ts);
    format!("{symbol}/{fetched_at}.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_is_symbol_slash_timestamp_json() {
        let record = json!({"symbol": "AAPL", "fetched_at": 1_700_000_000, "c": 189.5});
        assert_eq!(object_key(&record, 0), "AAPL/1700000000.json");
    }

    #[test]
    fn derivation_is_deterministic() {
        let record = json!({"symbol": "MSFT", "fetched_at": 42});
        assert_eq!(object_key(&record, 0), object_key(&record, 99));
    }

    #[test]
    fn identical_pairs_yield_identical_keys() {
        let first = json!({"symbol": "TSLA", "fetched_at": 7, "c": 1.0});
        let second = json!({"symbol": "TSLA", "fetched_at": 7, "c": 2.0});
        assert_eq!(object_key(&first, 0), object_key(&second, 0));
    }

    #[test]
    fn distinct_pairs_yield_distinct_keys() {
        let a = json!({"symbol": "AAPL", "fetched_at": 1});
        let b = json!({"symbol": "AAPL", "fetched_at": 2});
        let c = json!({"symbol": "MSFT", "fetched_at": 1});
        assert_ne!(object_key(&a, 0), object_key(&b, 0));
        assert_ne!(object_key(&a, 0), object_key(&c, 0));
    }

    #[test]
    fn missing_symbol_falls_back_to_unknown() {
        let record = json!({"fetched_at": 1_700_000_000});
        assert_eq!(object_key(&record, 0), "unknown/1700000000.json");
    }

    #[test]
    fn non_string_symbol_falls_back_to_unknown() {
        let record = json!({"symbol": 42, "fetched_at": 5});
        assert_eq!(object_key(&record, 0), "unknown/5.json");
    }

    #[test]
    fn missing_fetched_at_uses_fallback_timestamp() {
        let record = json!({"symbol": "AAPL"});
        assert_eq!(object_key(&record, 1_700_000_123), "AAPL/1700000123.json");
    }
}
