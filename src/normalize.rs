//! Document normalization: decoding the `message` envelope.
//!
//! Log shippers commonly deliver a wire envelope whose `message` field is a
//! JSON-encoded string holding the logical document. Fork conditions are
//! written against the logical schema, so the envelope is decoded exactly
//! once, before any condition evaluation or persistence.

use crate::document::Document;

/// Normalizes a document for routing.
///
/// If the document has a string `message` field that parses as a JSON
/// object, the parsed keys are merged into the top level and the enclosing
/// `message` field is dropped; parsed keys win on collision (a `message`
/// key inside the envelope replaces the envelope itself). Decoding repeats
/// until the `message` field, if any, is no longer a JSON-object string, so
/// normalizing an already-normalized document is a no-op. A `message` that
/// is absent, non-string, or not a JSON object is left untouched.
#[must_use]
pub fn normalize(mut document: Document) -> Document {
    loop {
        let Some(serde_json::Value::String(raw)) = document.get("message") else {
            return document;
        };

        let Ok(serde_json::Value::Object(parsed)) = serde_json::from_str::<serde_json::Value>(raw)
        else {
            return document;
        };

        let mut fields = document.fields().clone();
        fields.remove("message");
        for (key, value) in parsed {
            fields.insert(key, value);
        }
        // Each pass replaces `message` with a strictly shorter payload, so
        // decoding reaches a fixed point.
        document = Document::from_fields(fields);
    }
}
