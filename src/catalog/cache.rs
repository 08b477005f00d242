// src/catalog/cache.rs

//! Get-or-create caches over the name dimension tables
//!
//! The dimension table's UNIQUE constraint is the source of truth; the
//! in-memory map only saves round trips and is populated from the table,
//! never ahead of it.

use crate::db::models::Dimension;
use crate::error::Result;
use rusqlite::Connection;
use std::collections::HashMap;
use tracing::trace;

/// Text -> identity cache for one dimension
#[derive(Debug)]
pub struct NameCache {
    dimension: Dimension,
    entries: HashMap<String, i64>,
}

impl NameCache {
    pub fn new(dimension: Dimension) -> Self {
        Self {
            dimension,
            entries: HashMap::new(),
        }
    }

    /// Resolve `text` to its identity, inserting it on first sight
    pub fn resolve(&mut self, conn: &Connection, text: &str) -> Result<i64> {
        if let Some(&id) = self.entries.get(text) {
            return Ok(id);
        }

        let id = match self.dimension.lookup(conn, text)? {
            Some(id) => id,
            None => {
                let id = self.dimension.insert(conn, text)?;
                trace!("New {} name {} -> {}", self.dimension, text, id);
                id
            }
        };

        self.entries.insert(text.to_string(), id);
        Ok(id)
    }

    /// Drop the in-memory entries
    ///
    /// Needed after a transaction rollback, which may discard rows the map
    /// still points at.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One independent cache per dimension
#[derive(Debug)]
pub struct NameCaches {
    pub users: NameCache,
    pub groups: NameCache,
    pub symbols: NameCache,
    pub provides: NameCache,
    pub requires: NameCache,
}

impl NameCaches {
    pub fn new() -> Self {
        Self {
            users: NameCache::new(Dimension::User),
            groups: NameCache::new(Dimension::Group),
            symbols: NameCache::new(Dimension::Symbol),
            provides: NameCache::new(Dimension::Provides),
            requires: NameCache::new(Dimension::Requires),
        }
    }

    pub fn get_mut(&mut self, dimension: Dimension) -> &mut NameCache {
        match dimension {
            Dimension::User => &mut self.users,
            Dimension::Group => &mut self.groups,
            Dimension::Symbol => &mut self.symbols,
            Dimension::Provides => &mut self.provides,
            Dimension::Requires => &mut self.requires,
        }
    }

    pub fn clear(&mut self) {
        for dimension in Dimension::ALL {
            self.get_mut(dimension).clear();
        }
    }
}

impl Default for NameCaches {
    fn default() -> Self {
        Self::new()
    }
}
