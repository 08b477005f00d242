// src/db/models/package.rs

//! Package model - one imported binary RPM

use crate::error::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};

const COLUMNS: &str =
    "id, tag_id, name, version, release, build_time, arch, source_name, filename, is_update";

/// A Package is one artifact imported into a tag
///
/// (tag_id, name, version, release, arch) is unique; re-imports are rejected
/// by the caller before insertion.
#[derive(Debug, Clone)]
pub struct Package {
    pub id: Option<i64>,
    pub tag_id: i64,
    pub name: String,
    pub version: String,
    pub release: String,
    /// Build timestamp in seconds since the epoch
    pub build_time: i64,
    pub arch: String,
    /// Originating source package name, version suffix stripped
    pub source_name: String,
    /// Archive file name the package was imported from
    pub filename: String,
    /// Imported from the tag's update path
    pub is_update: bool,
}

impl Package {
    /// Insert this package into the database
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO packages (tag_id, name, version, release, build_time, arch, source_name, filename, is_update)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                &self.tag_id,
                &self.name,
                &self.version,
                &self.release,
                &self.build_time,
                &self.arch,
                &self.source_name,
                &self.filename,
                &self.is_update,
            ],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// Look up a package by its identifying tuple
    pub fn find_existing(
        conn: &Connection,
        tag_id: i64,
        name: &str,
        version: &str,
        release: &str,
        arch: &str,
    ) -> Result<Option<Self>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM packages
             WHERE tag_id = ?1 AND name = ?2 AND version = ?3 AND release = ?4 AND arch = ?5"
        );
        let package = conn
            .query_row(
                &sql,
                params![tag_id, name, version, release, arch],
                Self::from_row,
            )
            .optional()?;
        Ok(package)
    }

    /// Find a package by id
    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let sql = format!("SELECT {COLUMNS} FROM packages WHERE id = ?1");
        let package = conn.query_row(&sql, [id], Self::from_row).optional()?;
        Ok(package)
    }

    /// All packages of a tag, ordered by name
    pub fn find_by_tag(conn: &Connection, tag_id: i64) -> Result<Vec<Self>> {
        let sql = format!("SELECT {COLUMNS} FROM packages WHERE tag_id = ?1 ORDER BY name, version");
        let mut stmt = conn.prepare(&sql)?;
        let packages = stmt
            .query_map([tag_id], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(packages)
    }

    /// Packages imported from the tag's update path, ordered by archive name
    pub fn find_updates(conn: &Connection, tag_id: i64) -> Result<Vec<Self>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM packages WHERE tag_id = ?1 AND is_update = 1 ORDER BY filename ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let packages = stmt
            .query_map([tag_id], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(packages)
    }

    /// name-version-release
    pub fn nvr(&self) -> String {
        format!("{}-{}-{}", self.name, self.version, self.release)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            tag_id: row.get(1)?,
            name: row.get(2)?,
            version: row.get(3)?,
            release: row.get(4)?,
            build_time: row.get(5)?,
            arch: row.get(6)?,
            source_name: row.get(7)?,
            filename: row.get(8)?,
            is_update: row.get(9)?,
        })
    }
}
