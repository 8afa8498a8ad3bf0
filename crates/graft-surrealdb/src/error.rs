//! Mapping SurrealDB failures onto [`StoreError`]
//!
//! The SDK does not expose a stable error taxonomy across engines, so the
//! classification looks at the rendered message the same way the schema code
//! checks for "already exists".

use graft_core::StoreError;

const TRANSIENT_MARKERS: &[&str] = &[
    "conflict",
    "can be retried",
    "resource busy",
    "transaction was cancelled",
];

const CONNECTION_MARKERS: &[&str] = &[
    "connection",
    "websocket",
    "timed out",
    "broken pipe",
    "not connected",
    "already shutdown",
];

/// Classify an SDK error, prefixing the message with `context`
pub(crate) fn classify(context: &str, err: impl std::fmt::Display) -> StoreError {
    let message = err.to_string();
    let lowered = message.to_lowercase();
    let text = format!("{}: {}", context, message);

    if CONNECTION_MARKERS.iter().any(|m| lowered.contains(m)) {
        StoreError::Connection(text)
    } else if TRANSIENT_MARKERS.iter().any(|m| lowered.contains(m)) {
        StoreError::Transaction(text)
    } else {
        StoreError::Query(text)
    }
}

/// Statements after a failing one inside a transaction all report this
pub(crate) fn is_cascade(message: &str) -> bool {
    message.contains("failed transaction")
}
