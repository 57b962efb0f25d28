//! Run Data Model
//!
//! Schema-less documents exchanged between the caller, the engine and
//! individual actions.
//!
//! # Example Event
//!
//! ```yaml
//! "0":
//!   name: first
//! "1":
//!   name: second
//! send_email:
//!   to: ops@example.com
//! other: some other info
//! ```
//!
//! Step `0` receives `{name: first}`, a step whose action is `send_email`
//! receives `{to: ops@example.com}`, and every other step receives a copy of
//! the whole event.

use serde_json::{Map, Value};

/// Key-value document used for event payloads, step inputs and step outputs.
///
/// Values are `serde_json::Value`: a tagged union of null, bool, number,
/// string, list and nested document.
pub type Document = Map<String, Value>;

/// Converts an arbitrary value into a document.
///
/// Objects are used as-is. Any other value is wrapped under the `value` key,
/// so `to_document(json!(3))` yields `{"value": 3}`.
///
/// # Example
///
/// ```
/// use durable_runner::workflow::to_document;
/// use serde_json::json;
///
/// let doc = to_document(json!({"a": 1}));
/// assert_eq!(doc["a"], json!(1));
/// ```
pub fn to_document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        Value::Null => Document::new(),
        other => {
            let mut doc = Document::new();
            doc.insert("value".to_string(), other);
            doc
        }
    }
}

/// Derives the input document of a single step from the run event.
///
/// Lookup order:
/// 1. `event["<index>"]` when it is a document
/// 2. `event["<action_id>"]` when it is a document
/// 3. a copy of the whole event
///
/// The returned document is always an independent copy.
pub fn derive_step_input(event: &Document, index: usize, action_id: &str) -> Document {
    let by_index = event.get(&index.to_string()).and_then(Value::as_object);
    let by_action = || event.get(action_id).and_then(Value::as_object);

    match by_index.or_else(by_action) {
        Some(sub) => sub.clone(),
        None => event.clone(),
    }
}
