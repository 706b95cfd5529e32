//! Multi-source business aggregation and website capability scoring.
//!
//! Two-stage pipeline: provider adapters discover business candidates for
//! a geographic query and the aggregator deduplicates them into canonical
//! records; the scoring engine then fetches each record's website, runs a
//! fixed battery of capability checks, and classifies the business into an
//! outreach priority tier.
//!
//! # Modules
//!
//! - `aggregator`: multi-provider fan-out and deduplication.
//! - `analysis`: site fetching, the check battery, and both scoring paths.
//! - `cli`: interactive menu driving the pipeline.
//! - `config`: YAML configuration with environment-variable credentials.
//! - `errors`: provider/search/store error taxonomy.
//! - `geo`: bounded city-to-coordinate table.
//! - `leads`: lead scoring strategies and priority mapping.
//! - `models`: candidate and identity types.
//! - `providers`: one adapter per external place-data source.
//! - `store`: sqlite persistence collaborator.

pub mod aggregator;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod errors;
pub mod geo;
pub mod leads;
pub mod models;
pub mod providers;
pub mod store;
