// src/catalog/mod.rs

//! Catalogue construction
//!
//! [`ingest`] persists artifacts into a tag; [`cache`] keeps name
//! resolution cheap while it does.

pub mod cache;
pub mod ingest;

pub use cache::{NameCache, NameCaches};
pub use ingest::{ImportOutcome, ImportStats, ImportSummary, Importer};
