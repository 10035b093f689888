// src/models/mod.rs

//! Domain models for the outage crawler.
//!
//! - `config`: immutable runtime configuration
//! - `source`: upstream response shapes
//! - `record`: canonical records written to the store

mod config;
mod record;
mod source;

// Re-export all public types
pub use config::{
    CacheConfig, Config, EndpointConfig, HttpConfig, StorageConfig, COUNCIL_PLACEHOLDER,
    SUBURB_PLACEHOLDER,
};
pub use record::{DemandReading, NaturalKey, OutageEvent, SummarySnapshot};
pub use source::{CouncilEntry, Envelope, SourceEvent, SuburbEntry, SummaryData};
