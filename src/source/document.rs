use super::Mapping;
use crate::error::SourceError;
use crate::schema::join_key;
use serde_json::{Map, Value};

/// Parses a JSON document whose root must be an object
pub fn parse_document(data: &[u8], origin: &str) -> Result<Map<String, Value>, SourceError> {
    let value: Value = serde_json::from_slice(data).map_err(|source| SourceError::Parse {
        origin: origin.to_string(),
        source,
    })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(SourceError::NotAnObject {
            origin: origin.to_string(),
        }),
    }
}

/// Flattens nested objects into dotted keys
///
/// Arrays become one comma joined string of their elements. `null` members
/// produce no key.
pub fn flatten(document: &Map<String, Value>) -> Mapping {
    let mut result = Mapping::new();
    flatten_into("", document, &mut result);
    result
}

fn flatten_into(prefix: &str, object: &Map<String, Value>, result: &mut Mapping) {
    for (key, value) in object {
        let full_key = join_key(prefix, key);
        match value {
            Value::Object(nested) => flatten_into(&full_key, nested, result),
            Value::Null => {}
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(element_string).collect();
                result.insert(full_key, parts.join(","));
            }
            scalar => {
                result.insert(full_key, element_string(scalar));
            }
        }
    }
}

fn element_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // containers inside arrays keep their JSON text
        other => other.to_string(),
    }
}
