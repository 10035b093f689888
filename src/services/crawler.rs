// src/services/crawler.rs

//! Outage feed crawler.
//!
//! Walks councils, then each council's suburbs, then each suburb's events,
//! one blocking request at a time. Any failed request aborts the crawl; a
//! failing council or suburb is never skipped.

use crate::error::Result;
use crate::models::{Config, CouncilEntry, Envelope, SourceEvent, SuburbEntry, SummaryData};
use crate::services::Fetcher;

/// Summary of a hierarchical crawl.
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    /// Events in encounter order: council, then suburb, then event
    pub events: Vec<SourceEvent>,
    pub council_total: usize,
    pub suburb_total: usize,
}

/// Service for reading the outage feeds.
pub struct OutageCrawler<'a> {
    config: &'a Config,
    fetcher: &'a Fetcher,
}

impl<'a> OutageCrawler<'a> {
    pub fn new(config: &'a Config, fetcher: &'a Fetcher) -> Self {
        Self { config, fetcher }
    }

    /// Raw network demand text.
    pub fn fetch_demand(&self) -> Result<String> {
        self.fetcher.fetch_text(&self.config.endpoints.demand_url)
    }

    pub fn fetch_summary(&self) -> Result<SummaryData> {
        let envelope: Envelope<SummaryData> =
            self.fetcher.fetch_json(&self.config.endpoints.summary_url)?;
        Ok(envelope.data)
    }

    pub fn fetch_councils(&self) -> Result<Vec<CouncilEntry>> {
        let envelope: Envelope<Vec<CouncilEntry>> =
            self.fetcher.fetch_json(&self.config.endpoints.councils_url)?;
        Ok(envelope.data)
    }

    pub fn fetch_suburbs(&self, council: &CouncilEntry) -> Result<Vec<SuburbEntry>> {
        let url = self.config.council_suburbs_url(&council.name);
        let envelope: Envelope<Vec<SuburbEntry>> = self.fetcher.fetch_json(&url)?;
        Ok(envelope.data)
    }

    pub fn fetch_events(&self, suburb: &SuburbEntry) -> Result<Vec<SourceEvent>> {
        let url = self.config.suburb_events_url(&suburb.name);
        let envelope: Envelope<Vec<SourceEvent>> = self.fetcher.fetch_json(&url)?;
        Ok(envelope.data)
    }

    /// Fetch every event of every suburb of every council.
    pub fn crawl_events(&self) -> Result<CrawlOutcome> {
        let councils = self.fetch_councils()?;
        log::info!("Found {} councils", councils.len());

        let mut outcome = CrawlOutcome {
            council_total: councils.len(),
            ..CrawlOutcome::default()
        };

        for council in &councils {
            let suburbs = self.fetch_suburbs(council)?;
            log::debug!("{}: {} suburbs", council.name, suburbs.len());
            outcome.suburb_total += suburbs.len();

            for suburb in &suburbs {
                let events = self.fetch_events(suburb)?;
                log::debug!("{} / {}: {} events", council.name, suburb.name, events.len());
                outcome.events.extend(events);
            }
        }

        Ok(outcome)
    }
}
