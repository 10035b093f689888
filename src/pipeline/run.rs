// src/pipeline/run.rs

//! One end-to-end run: fetch, normalize, deduplicate, commit.

use crate::error::Result;
use crate::models::{Config, DemandReading, SummarySnapshot};
use crate::services::{Fetcher, Normalizer, OutageCrawler};
use crate::storage::Store;

/// What a completed run persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub retrieved_at: String,
    pub demand: DemandReading,
    pub summary: SummarySnapshot,
    pub events_seen: usize,
    pub events_added: usize,
    pub events_skipped: usize,
}

/// Open the configured store and fetcher and execute one run.
///
/// The store connection is closed when this returns, whether or not the run
/// succeeded.
pub fn run(config: &Config) -> Result<RunReport> {
    let fetcher = Fetcher::from_config(config)?;
    let mut store = Store::open(&config.storage.database_path)?;
    log::info!("Opened store at {}", config.storage.database_path.display());
    run_pipeline(config, &fetcher, &mut store, &Normalizer::now())
}

/// Execute one run against an open store.
///
/// Every statement goes through a single transaction that is committed only
/// after the last event. An error anywhere drops the transaction, which
/// discards every row written so far.
pub fn run_pipeline(
    config: &Config,
    fetcher: &Fetcher,
    store: &mut Store,
    normalizer: &Normalizer,
) -> Result<RunReport> {
    let crawler = OutageCrawler::new(config, fetcher);
    let run = store.begin_run()?;

    log::info!("Reading network demand");
    let demand = normalizer.demand(&crawler.fetch_demand()?)?;
    run.insert_demand(&demand)?;

    log::info!("Reading outage summary");
    let summary = normalizer.summary(&crawler.fetch_summary()?)?;
    run.insert_summary(&summary)?;

    log::info!("Reading councils, suburbs and events");
    let outcome = crawler.crawl_events()?;

    let mut events_added = 0;
    let mut events_skipped = 0;
    for source in &outcome.events {
        let event = normalizer.event(source)?;
        if run.exists_event(&event)? {
            events_skipped += 1;
        } else {
            run.insert_event(&event)?;
            events_added += 1;
        }
    }

    run.commit()?;

    log::info!(
        "Run {} committed: {} councils, {} suburbs, {} events ({} added, {} skipped)",
        normalizer.retrieved_at(),
        outcome.council_total,
        outcome.suburb_total,
        outcome.events.len(),
        events_added,
        events_skipped
    );

    Ok(RunReport {
        retrieved_at: normalizer.retrieved_at().to_string(),
        demand,
        summary,
        events_seen: outcome.events.len(),
        events_added,
        events_skipped,
    })
}
