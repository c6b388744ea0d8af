//! Result snapshots: how a selection is frozen into a record and read back.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, warn};

const EMPTY_SNAPSHOT: &str = "[]";

/// Serializes a selection. Never yields partial JSON: on failure the
/// snapshot is an empty array.
pub fn freeze<T: Serialize>(selection: &[T]) -> String {
    serde_json::to_string(selection).unwrap_or_else(|e| {
        error!("Could not serialize result snapshot, storing an empty one: {}", e);
        EMPTY_SNAPSHOT.to_string()
    })
}

/// Parses an encoded snapshot, yielding an empty list when it is corrupt.
pub fn thaw<T: DeserializeOwned>(encoded: &str) -> Vec<T> {
    serde_json::from_str(encoded).unwrap_or_else(|e| {
        warn!("Discarding unreadable result snapshot: {}", e);
        Vec::new()
    })
}

/// Like [`thaw`], for snapshots stored either encoded as a string or inline.
pub fn thaw_value<T: DeserializeOwned>(raw: Option<&Value>) -> Vec<T> {
    match raw {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(encoded)) => thaw(encoded),
        Some(inline) => Vec::<T>::deserialize(inline).unwrap_or_else(|e| {
            warn!("Discarding unreadable inline result snapshot: {}", e);
            Vec::new()
        }),
    }
}
