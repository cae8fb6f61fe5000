///! Best-effort serde helpers for the loosely typed game APIs.
///!
///! Numeric attributes come back as integers, floats, numeric strings or
///! `null` depending on the card; everything that is not a usable number
///! decodes to zero.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode any JSON value into an `i32`, falling back to 0.
pub fn int_or_zero<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .map(|v| v as i32)
            .or_else(|| n.as_f64().map(|v| v as i32))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<f64>().map(|v| v as i32).unwrap_or(0),
        _ => 0,
    })
}

/// Decode a string that may be `null` or a bare number.
pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}
