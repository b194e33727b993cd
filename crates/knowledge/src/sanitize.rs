//! Metadata sanitization ahead of indexing.

use crate::types::{Metadata, Passage};
use serde_json::Value;

/// Whether a metadata value may be stored.
fn is_storable(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Drop metadata entries whose value is `null` or the empty string.
pub fn sanitize_metadata(metadata: Metadata) -> Metadata {
    metadata
        .into_iter()
        .filter(|(_, value)| is_storable(value))
        .collect()
}

/// Sanitize every passage's metadata. Order, count and content are preserved.
pub fn sanitize(passages: Vec<Passage>) -> Vec<Passage> {
    passages
        .into_iter()
        .map(|passage| Passage {
            content: passage.content,
            metadata: sanitize_metadata(passage.metadata),
        })
        .collect()
}
