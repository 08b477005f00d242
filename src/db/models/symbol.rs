// src/db/models/symbol.rs

//! SymbolEntry model - a dynamic symbol exported by one ELF file

use crate::error::Result;
use rusqlite::{Connection, params};

#[derive(Debug, Clone)]
pub struct SymbolEntry {
    pub id: Option<i64>,
    pub tag_id: i64,
    pub package_id: i64,
    pub file_id: i64,
    pub name_id: i64,
}

impl SymbolEntry {
    pub fn new(tag_id: i64, package_id: i64, file_id: i64, name_id: i64) -> Self {
        Self {
            id: None,
            tag_id,
            package_id,
            file_id,
            name_id,
        }
    }

    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO symbols (tag_id, package_id, file_id, name_id) VALUES (?1, ?2, ?3, ?4)",
            params![self.tag_id, self.package_id, self.file_id, self.name_id],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// Symbol names recorded for a file, in insertion order
    pub fn names_for_file(conn: &Connection, file_id: i64) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT n.name FROM symbols s JOIN symbol_names n ON n.id = s.name_id
             WHERE s.file_id = ?1 ORDER BY s.id",
        )?;
        let names = stmt
            .query_map([file_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }
}
