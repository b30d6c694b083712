//! Stock generated defaults for field declarations.

use serde_json::Value as JsonValue;
use uuid::Uuid;

/// A freshly minted idempotency key.
///
/// Declared via `FieldDescriptor::generated_default`, so a dump that
/// substitutes it reports `retry_safe = false`: replaying the request
/// would mint a second key and defeat idempotent deduplication.
pub fn idempotency_key() -> JsonValue {
    JsonValue::String(Uuid::new_v4().to_string())
}
