use serde::Serialize;
use serde_json::{Map, Value};

/// One scalar leaf of a usage document, addressed by its full path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatEntry {
    /// Underscore-joined path from the root, e.g. `five_hour_utilization`
    pub path: String,
    /// Last path segment only
    pub key: String,
    /// Non-null scalar (number, string or bool)
    pub value: Value,
}

/// Flattens a document into its scalar leaves.
///
/// Only objects are traversed from the root; any other root shape yields
/// nothing. Nulls and non-object array elements are skipped.
pub fn flatten(document: &Value) -> Vec<FlatEntry> {
    let mut entries = Vec::new();
    if let Value::Object(map) = document {
        flatten_into(map, "", &mut entries);
    }
    entries
}

fn flatten_into(map: &Map<String, Value>, prefix: &str, out: &mut Vec<FlatEntry>) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}_{}", prefix, key)
        };

        match value {
            Value::Object(inner) => flatten_into(inner, &path, out),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if let Value::Object(inner) = item {
                        flatten_into(inner, &format!("{}_{}", path, i + 1), out);
                    }
                }
            }
            Value::Null => {}
            scalar => out.push(FlatEntry {
                path,
                key: key.clone(),
                value: scalar.clone(),
            }),
        }
    }
}
