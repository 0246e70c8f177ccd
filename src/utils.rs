use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize a string that upstream sometimes ships as a number or null.
pub(crate) fn string_or_default<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Deserialize an optional unsigned count that may arrive as a numeric string.
pub(crate) fn u32_or_default<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(crate::normalize::to_number(&value)
        .filter(|n| *n >= 0.0)
        .map(|n| n as u32)
        .unwrap_or_default())
}

/// Deserialize a `Vec` that may be null or absent.
pub(crate) fn vec_or_default<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let value = Option::<Vec<T>>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

/// Keep at most `max` characters of an error body.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// `"—"` for blank values, used by every table cell.
pub(crate) fn dash_if_empty(value: &str) -> String {
    if value.trim().is_empty() {
        "—".to_string()
    } else {
        value.to_string()
    }
}
