//! JSON text <-> Value conversions.

use serde::de::DeserializeOwned;
use serde::Serialize;
use soulconf_core_store::{Error, Value};

pub use soulconf_core_store::json::{json_to_value, value_to_json};

/// Parse a configuration document.
///
/// Fails when the bytes are not JSON or when the root is not an object.
pub fn decode(bytes: &[u8]) -> Result<Value, Error> {
    let json: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| Error::decode(e.to_string()))?;
    match json_to_value(json) {
        root @ Value::Map(_) => Ok(root),
        other => Err(Error::decode(format!(
            "document root must be an object, found {}",
            kind(&other)
        ))),
    }
}

/// Serialize a document to its canonical, pretty-printed text form.
pub fn encode(value: &Value) -> Result<String, Error> {
    let json = value_to_json(value);
    let mut text = serde_json::to_string_pretty(&json).map_err(|e| Error::encode(e.to_string()))?;
    text.push('\n');
    Ok(text)
}

/// Convert a Value to a Rust type via serde.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    serde_json::from_value(value_to_json(&value)).map_err(|e| Error::decode(e.to_string()))
}

/// Convert a Rust type to a Value via serde.
pub fn to_value<T: Serialize>(data: &T) -> Result<Value, Error> {
    let json = serde_json::to_value(data).map_err(|e| Error::encode(e.to_string()))?;
    Ok(json_to_value(json))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Integer(_) | Value::Unsigned(_) | Value::Float(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Map(_) => "an object",
    }
}
