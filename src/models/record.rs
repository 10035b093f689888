//! Canonical record shapes persisted by the store.

use serde::{Deserialize, Serialize};

/// Instantaneous network demand, one per run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DemandReading {
    pub demand: i64,

    /// Bucket in `1..=12`
    pub rating: i64,

    pub retrieved_at: String,
}

/// Network-wide outage summary, one per run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummarySnapshot {
    pub retrieved_at: String,

    /// When the upstream last refreshed its figures
    pub updated_at: String,

    pub total_customers_affected: i64,
}

/// A normalized outage event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutageEvent {
    /// Lowercased upstream identifier
    pub event_name: String,

    /// Title-cased council name
    pub council: String,

    /// Title-cased suburb name
    pub suburb: String,

    pub post_code: String,

    pub customers_affected: i64,

    pub cause: String,

    pub restore_at: String,

    /// Sorted, comma-joined, title-cased street names
    pub streets: String,

    pub retrieved_at: String,
}

impl OutageEvent {
    /// Natural key identifying the same physical outage across runs.
    ///
    /// `retrieved_at` and `post_code` are not part of it.
    pub fn natural_key(&self) -> NaturalKey<'_> {
        NaturalKey {
            event_name: &self.event_name,
            council: &self.council,
            suburb: &self.suburb,
            customers_affected: self.customers_affected,
            cause: &self.cause,
            restore_at: &self.restore_at,
            streets: &self.streets,
        }
    }
}

/// Borrowed view of an event's natural key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NaturalKey<'a> {
    pub event_name: &'a str,
    pub council: &'a str,
    pub suburb: &'a str,
    pub customers_affected: i64,
    pub cause: &'a str,
    pub restore_at: &'a str,
    pub streets: &'a str,
}
