//! Helpers for decoding the panel's loosely typed JSON
//!
//! The panel reports sizes, counts and speeds sometimes as JSON numbers and
//! sometimes as decimal strings, occasionally as `null` or `""`. These helpers
//! accept all of them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Interpret a JSON value as a non-negative integer
///
/// Numbers and decimal strings are accepted; anything else yields `None`.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use xunlei_client::utils::lenient_u64;
///
/// assert_eq!(lenient_u64(&json!(42)), Some(42));
/// assert_eq!(lenient_u64(&json!("1073741824")), Some(1_073_741_824));
/// assert_eq!(lenient_u64(&json!("")), None);
/// assert_eq!(lenient_u64(&json!(null)), None);
/// ```
pub fn lenient_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Serde adapter: number-or-string field, defaulting to 0
pub(crate) fn de_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(lenient_u64(&value).unwrap_or(0))
}

/// Serde adapter: number-or-string field, `None` when absent or unparseable
pub(crate) fn de_opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(lenient_u64(&value))
}

/// Serde adapter: string field where `null` means empty
pub(crate) fn de_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Serde adapter: RFC 3339 timestamp, `None` when absent or unparseable
pub(crate) fn de_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Parse an RFC 3339 timestamp into UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
