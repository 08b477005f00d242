// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use rpmcat::Result;
use rpmcat::db;
use rpmcat::db::models::Tag;
use rpmcat::packages::{Artifact, PackageFile, PackageHeader};
use rusqlite::Connection;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::TempDir;

/// Create a fresh on-disk catalogue.
///
/// Returns (TempDir, db_path, connection) - keep the TempDir alive to prevent cleanup.
pub fn setup_catalog() -> (TempDir, String, Connection) {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir
        .path()
        .join("catalog.db")
        .to_str()
        .unwrap()
        .to_string();

    db::init(&db_path).unwrap();
    let conn = db::open(&db_path).unwrap();
    (temp_dir, db_path, conn)
}

/// Insert a tag with placeholder paths and return it with its id set
pub fn create_tag(conn: &Connection, name: &str) -> Tag {
    let mut tag = Tag::new(
        name.to_string(),
        format!("/srv/{}", name),
        format!("/srv/{}-updates", name),
    );
    tag.insert(conn).unwrap();
    tag
}

/// In-memory artifact whose payload is a set of executables
pub struct FixtureArtifact {
    pub header: PackageHeader,
    pub provides: Vec<String>,
    pub requires: Vec<String>,
    pub files: Vec<PackageFile>,
    /// (install path, content) pairs written by `explode` with mode 0755
    pub payload: Vec<(String, Vec<u8>)>,
}

impl FixtureArtifact {
    /// A package with no files and no capabilities
    pub fn new(name: &str, version: &str, release: &str) -> Self {
        Self {
            header: PackageHeader {
                name: name.to_string(),
                version: version.to_string(),
                release: release.to_string(),
                arch: "x86_64".to_string(),
                build_time: 1_700_000_000,
                source_rpm: format!("{}-{}-{}.src.rpm", name, version, release),
                filename: format!("{}-{}-{}.x86_64.rpm", name, version, release),
            },
            provides: Vec::new(),
            requires: Vec::new(),
            files: Vec::new(),
            payload: Vec::new(),
        }
    }

    /// List a file in the header
    pub fn with_file(mut self, path: &str, user: &str, group: &str, mode: u32) -> Self {
        self.files.push(PackageFile {
            path: path.to_string(),
            user: user.to_string(),
            group: group.to_string(),
            mode,
        });
        self
    }

    /// List an executable in the header and ship `content` for it
    pub fn with_executable(self, path: &str, content: Vec<u8>) -> Self {
        let mut fixture = self.with_file(path, "root", "root", 0o100755);
        fixture.payload.push((path.to_string(), content));
        fixture
    }

    /// Ship the running test binary, a real ELF executable, at `path`
    pub fn with_elf(self, path: &str) -> Self {
        let exe = std::env::current_exe().unwrap();
        self.with_executable(path, std::fs::read(exe).unwrap())
    }

    pub fn with_provides(mut self, provides: &[&str]) -> Self {
        self.provides = provides.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_requires(mut self, requires: &[&str]) -> Self {
        self.requires = requires.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_source_rpm(mut self, source_rpm: &str) -> Self {
        self.header.source_rpm = source_rpm.to_string();
        self
    }
}

impl Artifact for FixtureArtifact {
    fn header(&self) -> &PackageHeader {
        &self.header
    }

    fn provides(&self) -> &[String] {
        &self.provides
    }

    fn requires(&self) -> &[String] {
        &self.requires
    }

    fn files(&self) -> &[PackageFile] {
        &self.files
    }

    fn explode(&self, dest: &Path) -> Result<usize> {
        for (path, content) in &self.payload {
            let target = dest.join(path.trim_start_matches('/'));
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&target, content)?;
            std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o755))?;
        }
        Ok(self.payload.len())
    }
}
