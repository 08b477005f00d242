// src/query/report.rs

//! Fixed reports over one tag: updates, set-id files, tag listing

use crate::db::models::{Package, Tag};
use crate::error::Result;
use rusqlite::Connection;

/// Which set-id bit to report on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetIdKind {
    Suid,
    Sgid,
}

impl SetIdKind {
    fn column(&self) -> &'static str {
        match self {
            SetIdKind::Suid => "f.is_suid",
            SetIdKind::Sgid => "f.is_sgid",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SetIdKind::Suid => "SUID",
            SetIdKind::Sgid => "SGID",
        }
    }
}

/// A set-id file and who owns it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetIdFile {
    pub package: String,
    pub path: String,
    pub user: String,
    pub group: String,
    pub perms: u32,
}

impl std::fmt::Display for SetIdFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} [{}:{} mode {:04o}]",
            self.package, self.path, self.user, self.group, self.perms
        )
    }
}

/// Archive names of packages imported from the tag's update path
pub fn list_updates(conn: &Connection, tag_name: &str) -> Result<Vec<String>> {
    let tag = Tag::require(conn, tag_name)?;
    let Some(tag_id) = tag.id else {
        return Ok(Vec::new());
    };
    let updates = Package::find_updates(conn, tag_id)?
        .into_iter()
        .map(|p| p.filename)
        .collect();
    Ok(updates)
}

/// Every SUID or SGID file in a tag, ordered by package name
pub fn list_setid(conn: &Connection, tag_name: &str, kind: SetIdKind) -> Result<Vec<SetIdFile>> {
    let tag = Tag::require(conn, tag_name)?;
    let sql = format!(
        "SELECT p.name, f.path, u.name, g.name, f.perms
         FROM files f
         JOIN packages p ON p.id = f.package_id
         JOIN user_names u ON u.id = f.user_id
         JOIN group_names g ON g.id = f.group_id
         WHERE {} = 1 AND f.tag_id = ?1
         ORDER BY p.name ASC, f.path ASC",
        kind.column()
    );
    let mut stmt = conn.prepare(&sql)?;
    let files = stmt
        .query_map([tag.id], |row| {
            Ok(SetIdFile {
                package: row.get(0)?,
                path: row.get(1)?,
                user: row.get(2)?,
                group: row.get(3)?,
                perms: row.get(4)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(files)
}

/// Every tag with its package count
pub fn list_tags(conn: &Connection) -> Result<Vec<(Tag, i64)>> {
    Tag::list_all(conn)?
        .into_iter()
        .map(|tag| {
            let count = tag.package_count(conn)?;
            Ok((tag, count))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::db::models::{Dimension, FileEntry};

    fn seed(conn: &Connection) -> i64 {
        let mut tag = Tag::new("T".to_string(), "/a".to_string(), "/b".to_string());
        let tag_id = tag.insert(conn).unwrap();

        for (name, is_update) in [("zeta", true), ("acme", false), ("beta", true)] {
            let mut package = Package {
                id: None,
                tag_id,
                name: name.to_string(),
                version: "1.0".to_string(),
                release: "1".to_string(),
                build_time: 0,
                arch: "x86_64".to_string(),
                source_name: name.to_string(),
                filename: format!("{}-1.0-1.x86_64.rpm", name),
                is_update,
            };
            let package_id = package.insert(conn).unwrap();
            let root = Dimension::User
                .lookup(conn, "root")
                .unwrap()
                .unwrap_or_else(|| Dimension::User.insert(conn, "root").unwrap());
            let wheel = Dimension::Group
                .lookup(conn, "wheel")
                .unwrap()
                .unwrap_or_else(|| Dimension::Group.insert(conn, "wheel").unwrap());
            FileEntry::new(
                tag_id,
                package_id,
                root,
                wheel,
                format!("/usr/bin/{}", name),
                if name == "acme" { 0o104755 } else { 0o102711 },
            )
            .insert(conn)
            .unwrap();
        }
        tag_id
    }

    #[test]
    fn test_list_updates_sorted() {
        let conn = db::open_in_memory().unwrap();
        seed(&conn);
        assert_eq!(
            list_updates(&conn, "T").unwrap(),
            vec!["beta-1.0-1.x86_64.rpm", "zeta-1.0-1.x86_64.rpm"]
        );
        assert!(list_updates(&conn, "U").is_err());
    }

    #[test]
    fn test_list_setid() {
        let conn = db::open_in_memory().unwrap();
        seed(&conn);

        let suid = list_setid(&conn, "T", SetIdKind::Suid).unwrap();
        assert_eq!(suid.len(), 1);
        assert_eq!(
            suid[0].to_string(),
            "acme: /usr/bin/acme [root:wheel mode 4755]"
        );

        let sgid = list_setid(&conn, "T", SetIdKind::Sgid).unwrap();
        let packages: Vec<_> = sgid.iter().map(|f| f.package.as_str()).collect();
        assert_eq!(packages, vec!["beta", "zeta"]);
    }

    #[test]
    fn test_list_tags_counts_packages() {
        let conn = db::open_in_memory().unwrap();
        seed(&conn);
        let tags = list_tags(&conn).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].0.name, "T");
        assert_eq!(tags[0].1, 3);
    }
}
