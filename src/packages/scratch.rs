// src/packages/scratch.rs

//! Scratch directories for exploded payloads

use crate::error::Result;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::TempDir;
use tracing::warn;
use walkdir::WalkDir;

/// A temporary directory that is removed on drop, even when the exploded
/// payload contains read-only directories
#[derive(Debug)]
pub struct ScratchDir {
    dir: Option<TempDir>,
}

impl ScratchDir {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("rpmcat-").tempdir()?;
        Ok(Self { dir: Some(dir) })
    }

    pub fn path(&self) -> &Path {
        match &self.dir {
            Some(dir) => dir.path(),
            None => Path::new(""),
        }
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        make_owner_writable(dir.path());
        let path = dir.path().to_path_buf();
        if let Err(e) = dir.close() {
            warn!("Failed to remove scratch directory {}: {}", path.display(), e);
        }
    }
}

/// Grant the owner rwx on every directory and rw on every file below `root`
fn make_owner_writable(root: &Path) {
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if entry.path_is_symlink() {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let extra = if metadata.is_dir() { 0o700 } else { 0o600 };
        let mut perms = metadata.permissions();
        let mode = perms.mode();
        if mode & extra != extra {
            perms.set_mode(mode | extra);
            if let Err(e) = std::fs::set_permissions(entry.path(), perms) {
                warn!("Failed to chmod {}: {}", entry.path().display(), e);
            }
        }
    }
}
