//! Upstream response shapes, as the outage API returns them.

use serde::{Deserialize, Deserializer, de};

/// Every JSON endpoint wraps its payload in `{"data": ...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// One entry of the council list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CouncilEntry {
    pub name: String,
}

/// One entry of a council's suburb list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SuburbEntry {
    pub name: String,
}

/// Network-wide outage summary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryData {
    #[serde(deserialize_with = "count")]
    pub total_customers_affected: i64,

    /// e.g. `05 January 2023 02:30 PM`
    pub last_updated: String,
}

/// One outage event as reported for a suburb.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceEvent {
    /// Upstream event identifier
    pub event: String,

    #[serde(default)]
    pub council: String,

    #[serde(default)]
    pub suburb: String,

    #[serde(default, deserialize_with = "text")]
    pub postcode: String,

    #[serde(default, deserialize_with = "count")]
    pub customers_affected: i64,

    #[serde(default)]
    pub cause: String,

    #[serde(default)]
    pub restore_time: Option<String>,

    #[serde(default, deserialize_with = "streets")]
    pub streets: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Text(s)) => s,
        Some(Scalar::Number(n)) => n.to_string(),
        None => String::new(),
    })
}

fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Number(n)) => n
            .as_i64()
            .ok_or_else(|| de::Error::custom(format!("count is not an integer: {n}"))),
        Some(Scalar::Text(s)) => s
            .trim()
            .parse()
            .map_err(|e| de::Error::custom(format!("count '{s}' is not an integer: {e}"))),
        None => Ok(0),
    }
}

fn streets<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
