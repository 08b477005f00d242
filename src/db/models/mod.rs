// src/db/models/mod.rs

//! Data models for catalogue entities
//!
//! This module defines Rust structs that correspond to database tables
//! and provides methods for creating and reading records. Nothing here
//! deletes: catalogue rows are immutable once imported.

mod dependency;
mod file_entry;
mod flags;
mod names;
mod package;
mod symbol;
mod tag;

pub use dependency::{DependencyEntry, DependencyKind};
pub use file_entry::FileEntry;
pub use flags::FlagsEntry;
pub use names::Dimension;
pub use package::Package;
pub use symbol::SymbolEntry;
pub use tag::Tag;
