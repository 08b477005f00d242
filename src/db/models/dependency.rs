// src/db/models/dependency.rs

//! DependencyEntry model - provides and requires of a package

use crate::error::Result;
use rusqlite::{Connection, params};

/// Which side of a capability declaration a row records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    Provides,
    Requires,
}

impl DependencyKind {
    /// Fact table for this kind
    pub fn table(&self) -> &'static str {
        match self {
            DependencyKind::Provides => "provides",
            DependencyKind::Requires => "requires",
        }
    }

    /// Dimension table holding the capability strings
    pub fn names_table(&self) -> &'static str {
        match self {
            DependencyKind::Provides => "provides_names",
            DependencyKind::Requires => "requires_names",
        }
    }
}

/// A capability row linking a package to a capability name
#[derive(Debug, Clone)]
pub struct DependencyEntry {
    pub id: Option<i64>,
    pub kind: DependencyKind,
    pub tag_id: i64,
    pub package_id: i64,
    pub name_id: i64,
}

impl DependencyEntry {
    pub fn new(kind: DependencyKind, tag_id: i64, package_id: i64, name_id: i64) -> Self {
        Self {
            id: None,
            kind,
            tag_id,
            package_id,
            name_id,
        }
    }

    /// Insert this capability into its fact table
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        let sql = format!(
            "INSERT INTO {} (tag_id, package_id, name_id) VALUES (?1, ?2, ?3)",
            self.kind.table()
        );
        conn.execute(&sql, params![self.tag_id, self.package_id, self.name_id])?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// Capability strings of one kind declared by a package, in insertion order
    pub fn names_for_package(
        conn: &Connection,
        kind: DependencyKind,
        package_id: i64,
    ) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT n.name FROM {} d JOIN {} n ON n.id = d.name_id
             WHERE d.package_id = ?1 ORDER BY d.id",
            kind.table(),
            kind.names_table()
        );
        let mut stmt = conn.prepare(&sql)?;
        let names = stmt
            .query_map([package_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }
}
