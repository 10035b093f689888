// src/lib.rs

//! Outage Crawler Library
//!
//! Crawls the council, suburb and event outage feeds plus the demand and
//! summary endpoints, and appends new records to a SQLite history.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
