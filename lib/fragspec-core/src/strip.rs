//! Removal of the bookkeeping keys once folding is done.

use serde_json::Value;

use crate::Document;
use crate::document::{INSTANCE_TAG_KEY, LOGICAL_NAME_KEY};

/// Removes the logical name and instance tag from every object of the document.
///
/// Only the `logicalName` and `instanceTag` keys are removed, whatever their value;
/// authored keys such as `id` are left alone. Running it twice is a no-op.
pub fn strip_bookkeeping(document: &mut Document) {
    document.visit_values_mut(|_, value| strip_value(value));
}

fn strip_value(value: &mut Value) {
    match value {
        Value::Object(object) => {
            object.shift_remove(LOGICAL_NAME_KEY);
            object.shift_remove(INSTANCE_TAG_KEY);
            for child in object.values_mut() {
                strip_value(child);
            }
        }
        Value::Array(items) => {
            for item in items {
                strip_value(item);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}
