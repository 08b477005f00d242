// src/lib.rs

//! rpmcat
//!
//! Catalogues binary RPM packages into a SQLite store and answers
//! tag-scoped queries about what they contain.
//!
//! # Architecture
//!
//! - Database-first: every fact lives in SQLite, keyed by tag
//! - Tags: named import collections (a release plus its update stream)
//! - Dimension tables: users, groups, symbols and capabilities are stored
//!   once and referenced by id
//! - Hardening flags: RELRO, SSP, PIE, NX and FORTIFY recorded per executable

pub mod binary;
pub mod catalog;
pub mod compression;
pub mod config;
pub mod db;
mod error;
pub mod packages;
pub mod query;

pub use binary::SecurityFlags;
pub use catalog::{ImportOutcome, ImportSummary, Importer};
pub use error::{Error, Result};
pub use query::{MatchMode, QueryKind, QueryOutcome, QueryRequest};
