//! Pipeline entry points.
//!
//! - `run`: open the configured store and fetcher, then execute one run
//! - `run_pipeline`: execute one run against an open store

pub mod run;

pub use run::{RunReport, run, run_pipeline};
