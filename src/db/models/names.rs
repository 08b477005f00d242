// src/db/models/names.rs

//! Name dimension tables - deduplicated text shared by every tag

use crate::error::Result;
use rusqlite::{Connection, OptionalExtension};

/// One of the five text dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    User,
    Group,
    Symbol,
    Provides,
    Requires,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::User,
        Dimension::Group,
        Dimension::Symbol,
        Dimension::Provides,
        Dimension::Requires,
    ];

    /// Backing table; never derived from user input
    pub fn table(&self) -> &'static str {
        match self {
            Dimension::User => "user_names",
            Dimension::Group => "group_names",
            Dimension::Symbol => "symbol_names",
            Dimension::Provides => "provides_names",
            Dimension::Requires => "requires_names",
        }
    }

    /// Exact-text lookup
    pub fn lookup(&self, conn: &Connection, name: &str) -> Result<Option<i64>> {
        let sql = format!("SELECT id FROM {} WHERE name = ?1", self.table());
        let id = conn.query_row(&sql, [name], |row| row.get(0)).optional()?;
        Ok(id)
    }

    /// Insert a new name and return its generated id
    pub fn insert(&self, conn: &Connection, name: &str) -> Result<i64> {
        let sql = format!("INSERT INTO {} (name) VALUES (?1)", self.table());
        conn.execute(&sql, [name])?;
        Ok(conn.last_insert_rowid())
    }

    /// Number of distinct names in this dimension
    pub fn count(&self, conn: &Connection) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table());
        let count = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count)
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::User => write!(f, "user"),
            Dimension::Group => write!(f, "group"),
            Dimension::Symbol => write!(f, "symbol"),
            Dimension::Provides => write!(f, "provides"),
            Dimension::Requires => write!(f, "requires"),
        }
    }
}
