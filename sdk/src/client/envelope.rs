//! Envelope unwrapping.
//!
//! The vendor wraps payloads in a few different ways. Extraction strategies
//! are tried in a fixed order and the first non-null hit wins; when nothing
//! matches the whole body is returned.

use serde_json::{Map, Value};

use crate::types::ResourceKind;

/// Key of the generic result envelope.
pub const RESULTS_KEY: &str = "Results";

/// One way of locating the payload inside an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// The `Results` key.
    Results,
    /// The singular resource name, e.g. `Treatment`.
    KindName,
    /// The plural resource name, e.g. `Treatments`.
    KindPlural,
}

/// Extraction order. `Results` always goes first.
pub const EXTRACTION_ORDER: [Extraction; 3] = [
    Extraction::Results,
    Extraction::KindName,
    Extraction::KindPlural,
];

impl Extraction {
    fn key<'a>(self, kind: Option<&'a ResourceKind>) -> Option<&'a str> {
        match self {
            Self::Results => Some(RESULTS_KEY),
            Self::KindName => kind.map(ResourceKind::name),
            Self::KindPlural => kind.map(ResourceKind::plural),
        }
    }
}

/// Returns the payload held in `body`.
#[must_use]
pub fn unwrap_envelope(body: Value, kind: Option<&ResourceKind>) -> Value {
    let Value::Object(mut map) = body else {
        return body;
    };

    for extraction in EXTRACTION_ORDER {
        if let Some(key) = extraction.key(kind) {
            if let Some(payload) = take_present(&mut map, key) {
                return payload;
            }
        }
    }

    Value::Object(map)
}

fn take_present(map: &mut Map<String, Value>, key: &str) -> Option<Value> {
    match map.get(key) {
        Some(value) if !value.is_null() => map.remove(key),
        _ => None,
    }
}
