// src/db/models/file_entry.rs

//! FileEntry model - files shipped by a package

use crate::error::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};

const S_ISUID: u32 = 0o4000;
const S_ISGID: u32 = 0o2000;

/// A file shipped by a catalogued package
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub id: Option<i64>,
    pub tag_id: i64,
    pub package_id: i64,
    pub user_id: i64,
    pub group_id: i64,
    pub path: String,
    pub is_suid: bool,
    pub is_sgid: bool,
    /// Permission bits including the setid/sticky bits
    pub perms: u32,
}

impl FileEntry {
    /// Create a FileEntry from a raw st_mode value
    pub fn new(
        tag_id: i64,
        package_id: i64,
        user_id: i64,
        group_id: i64,
        path: String,
        mode: u32,
    ) -> Self {
        Self {
            id: None,
            tag_id,
            package_id,
            user_id,
            group_id,
            path,
            is_suid: mode & S_ISUID != 0,
            is_sgid: mode & S_ISGID != 0,
            perms: mode & 0o7777,
        }
    }

    /// Insert this file into the database
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO files (tag_id, package_id, user_id, group_id, path, is_suid, is_sgid, perms)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &self.tag_id,
                &self.package_id,
                &self.user_id,
                &self.group_id,
                &self.path,
                &self.is_suid,
                &self.is_sgid,
                &self.perms,
            ],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// Resolve a file's catalogue id from its path within one package
    pub fn find_id(
        conn: &Connection,
        tag_id: i64,
        package_id: i64,
        path: &str,
    ) -> Result<Option<i64>> {
        let id = conn
            .query_row(
                "SELECT id FROM files WHERE tag_id = ?1 AND package_id = ?2 AND path = ?3
                 ORDER BY id LIMIT 1",
                params![tag_id, package_id, path],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// All files of a package
    pub fn find_by_package(conn: &Connection, package_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, tag_id, package_id, user_id, group_id, path, is_suid, is_sgid, perms
             FROM files WHERE package_id = ?1 ORDER BY path",
        )?;
        let files = stmt
            .query_map([package_id], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(files)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            tag_id: row.get(1)?,
            package_id: row.get(2)?,
            user_id: row.get(3)?,
            group_id: row.get(4)?,
            path: row.get(5)?,
            is_suid: row.get(6)?,
            is_sgid: row.get(7)?,
            perms: row.get(8)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_decomposition() {
        let entry = FileEntry::new(1, 1, 1, 1, "/usr/bin/passwd".to_string(), 0o104755);
        assert!(entry.is_suid);
        assert!(!entry.is_sgid);
        assert_eq!(entry.perms, 0o4755);

        let entry = FileEntry::new(1, 1, 1, 1, "/usr/bin/write".to_string(), 0o102755);
        assert!(!entry.is_suid);
        assert!(entry.is_sgid);
        assert_eq!(entry.perms, 0o2755);
    }
}
