//! Stream naming policy.

use uuid::Uuid;

/// Derives the stream name for an aggregate instance:
/// `"<aggregate_type>-<id>"`.
///
/// Deterministic; unique per `(aggregate_type, id)` pair because the type name
/// prefixes the identifier. The identifier is not escaped, so aggregate type
/// names containing `-` can produce ambiguous stream names.
#[must_use]
pub fn stream_name(aggregate_type: &str, id: Uuid) -> String {
    format!("{aggregate_type}-{id}")
}
