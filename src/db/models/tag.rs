// src/db/models/tag.rs

//! Tag model - a named import collection

use crate::error::{Error, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};

/// A Tag scopes every catalogue row imported from one source directory
#[derive(Debug, Clone)]
pub struct Tag {
    pub id: Option<i64>,
    pub name: String,
    /// Directory the primary packages were imported from
    pub path: String,
    /// Directory holding update packages for this tag
    pub update_path: String,
    pub created_at: Option<String>,
}

impl Tag {
    /// Create a new Tag
    pub fn new(name: String, path: String, update_path: String) -> Self {
        Self {
            id: None,
            name,
            path,
            update_path,
            created_at: None,
        }
    }

    /// Insert this tag; tags are created exactly once
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        if Self::find_by_name(conn, &self.name)?.is_some() {
            return Err(Error::AlreadyExists(format!("Tag {}", self.name)));
        }

        conn.execute(
            "INSERT INTO tags (name, path, update_path) VALUES (?1, ?2, ?3)",
            params![&self.name, &self.path, &self.update_path],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// Find a tag by its name
    pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Self>> {
        let tag = conn
            .query_row(
                "SELECT id, name, path, update_path, created_at FROM tags WHERE name = ?1",
                [name],
                Self::from_row,
            )
            .optional()?;
        Ok(tag)
    }

    /// Find a tag by name, turning absence into a user-facing error
    pub fn require(conn: &Connection, name: &str) -> Result<Self> {
        Self::find_by_name(conn, name)?.ok_or_else(|| Error::UnknownTag(name.to_string()))
    }

    /// Find a tag by id
    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let tag = conn
            .query_row(
                "SELECT id, name, path, update_path, created_at FROM tags WHERE id = ?1",
                [id],
                Self::from_row,
            )
            .optional()?;
        Ok(tag)
    }

    /// List all tags ordered by name
    pub fn list_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, path, update_path, created_at FROM tags ORDER BY name",
        )?;
        let tags = stmt
            .query_map([], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }

    /// Number of packages imported under this tag
    pub fn package_count(&self, conn: &Connection) -> Result<i64> {
        let Some(id) = self.id else {
            return Ok(0);
        };
        let count = conn.query_row(
            "SELECT COUNT(*) FROM packages WHERE tag_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            path: row.get(2)?,
            update_path: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}
