//! Service layer for the outage crawler.
//!
//! This module contains the business logic for:
//! - Cache-first fetching (`Fetcher`)
//! - Feed traversal (`OutageCrawler`)
//! - Record normalization (`Normalizer`)

mod crawler;
mod fetcher;
pub mod normalize;

pub use crawler::{CrawlOutcome, OutageCrawler};
pub use fetcher::Fetcher;
pub use normalize::Normalizer;
