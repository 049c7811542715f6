//! Quote Record
//!
//! A quote record is the upstream JSON object passed through opaquely, with
//! two fields injected at fetch time: `symbol` and `fetched_at` (epoch
//! seconds). Injection always wins over upstream fields of the same name;
//! the upstream payload is not trusted to supply either.

use serde_json::{Map, Value};

/// Field injected with the tracked symbol.
pub const SYMBOL_FIELD: &str = "symbol";

/// Field injected with the fetch timestamp (epoch seconds).
pub const FETCHED_AT_FIELD: &str = "fetched_at";

/// A fetched quote: upstream fields plus the injected identity fields.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteRecord {
    fields: Map<String, Value>,
}

impl QuoteRecord {
    /// Build a record from an upstream response body, injecting `symbol`
    /// and `fetched_at`. Upstream fields with those names are overwritten.
    ///
    /// Returns `None` if the body is not a JSON object.
    #[must_use]
    pub fn from_upstream(body: Value, symbol: &str, fetched_at: i64) -> Option<Self> {
        let Value::Object(mut fields) = body else {
            return None;
        };
        fields.insert(SYMBOL_FIELD.to_string(), Value::from(symbol));
        fields.insert(FETCHED_AT_FIELD.to_string(), Value::from(fetched_at));
        Some(Self { fields })
    }

    /// The injected symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        self.fields
            .get(SYMBOL_FIELD)
            .and_then(Value::as_str)
            .unwrap_or("unknown")
    }

    /// The injected fetch timestamp (epoch seconds).
    #[must_use]
    pub fn fetched_at(&self) -> i64 {
        self.fields
            .get(FETCHED_AT_FIELD)
            .and_then(Value::as_i64)
            .unwrap_or(0)
    }

    /// All fields, upstream and injected.
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// JSON-text encoding used as the message payload.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_payload(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn injects_symbol_and_fetched_at() {
        let body = json!({"c": 189.5, "h": 190.1, "l": 188.2});
        let record = QuoteRecord::from_upstream(body, "AAPL", 1_700_000_000).unwrap();

        assert_eq!(record.symbol(), "AAPL");
        assert_eq!(record.fetched_at(), 1_700_000_000);
        assert_eq!(record.fields().get("c"), Some(&json!(189.5)));
    }

    #[test]
    fn injection_overwrites_upstream_fields() {
        let body = json!({"symbol": "SPOOFED", "fetched_at": 1, "c": 1.0});
        let record = QuoteRecord::from_upstream(body, "MSFT", 1_700_000_042).unwrap();

        assert_eq!(record.symbol(), "MSFT");
        assert_eq!(record.fetched_at(), 1_700_000_042);
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert!(QuoteRecord::from_upstream(json!([1, 2, 3]), "AAPL", 0).is_none());
        assert!(QuoteRecord::from_upstream(json!("quote"), "AAPL", 0).is_none());
        assert!(QuoteRecord::from_upstream(Value::Null, "AAPL", 0).is_none());
    }

    #[test]
    fn payload_round_trips_all_fields() {
        let body = json!({"c": 250.25, "pc": 248.0});
        let record = QuoteRecord::from_upstream(body, "TSLA", 1_700_000_100).unwrap();

        let payload = record.to_payload().unwrap();
        let parsed: Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(parsed["symbol"], "TSLA");
        assert_eq!(parsed["fetched_at"], 1_700_000_100);
        assert_eq!(parsed["c"], 250.25);
        assert_eq!(parsed["pc"], 248.0);
    }
}
