// src/db/models/flags.rs

//! FlagsEntry model - hardening attributes of one ELF file

use crate::binary::flags::{Fortify, Nx, Pie, Relro, SecurityFlags, StackProtector};
use crate::error::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};

#[derive(Debug, Clone)]
pub struct FlagsEntry {
    pub id: Option<i64>,
    pub tag_id: i64,
    pub package_id: i64,
    pub file_id: i64,
    pub flags: SecurityFlags,
}

impl FlagsEntry {
    pub fn new(tag_id: i64, package_id: i64, file_id: i64, flags: SecurityFlags) -> Self {
        Self {
            id: None,
            tag_id,
            package_id,
            file_id,
            flags,
        }
    }

    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO flags (tag_id, package_id, file_id, relro, ssp, pie, nx, fortify)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                self.tag_id,
                self.package_id,
                self.file_id,
                self.flags.relro.code(),
                self.flags.ssp.code(),
                self.flags.pie.code(),
                self.flags.nx.code(),
                self.flags.fortify.code(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// The flags row of a file, if it was classified
    pub fn find_by_file(conn: &Connection, file_id: i64) -> Result<Option<Self>> {
        let entry = conn
            .query_row(
                "SELECT id, tag_id, package_id, file_id, relro, ssp, pie, nx, fortify
                 FROM flags WHERE file_id = ?1 ORDER BY id LIMIT 1",
                [file_id],
                Self::from_row,
            )
            .optional()?;
        Ok(entry)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            tag_id: row.get(1)?,
            package_id: row.get(2)?,
            file_id: row.get(3)?,
            flags: SecurityFlags {
                relro: Relro::from_code(row.get(4)?),
                ssp: StackProtector::from_code(row.get(5)?),
                pie: Pie::from_code(row.get(6)?),
                nx: Nx::from_code(row.get(7)?),
                fortify: Fortify::from_code(row.get(8)?),
            },
        })
    }
}
