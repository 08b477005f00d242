// src/packages/archive_utils.rs

//! Mode and path helpers shared by the payload exploder

use std::path::{Component, Path, PathBuf};

/// Refuse to write single payload members larger than this (512 MB)
pub const MAX_EXTRACTION_FILE_SIZE: u64 = 512 * 1024 * 1024;

pub const S_IFMT: u32 = 0o170000;
pub const S_IFREG: u32 = 0o100000;
pub const S_IXUSR: u32 = 0o100;

/// Check if mode corresponds to a regular file
pub fn is_regular_file_mode(mode: u32) -> bool {
    (mode & S_IFMT) == S_IFREG
}

/// Whether the owner-execute bit is set
pub fn is_owner_executable(mode: u32) -> bool {
    mode & S_IXUSR != 0
}

/// Normalize an archive member name to the absolute install path
///
/// `./usr/bin/foo`, `usr/bin/foo` and `/usr/bin/foo` all become
/// `/usr/bin/foo`. Only the leading `.` of the archive root is dropped,
/// so `./.hidden` stays a dotfile.
pub fn normalize_path(path: &str) -> String {
    let trimmed = match path.strip_prefix('.') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    };
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Location of an install path under `root`
///
/// Returns `None` for paths that would escape `root` (`..`) or name no file.
pub fn path_under(root: &Path, install_path: &str) -> Option<PathBuf> {
    let mut out = root.to_path_buf();
    let mut pushed = false;
    for component in Path::new(install_path).components() {
        match component {
            Component::Normal(part) => {
                out.push(part);
                pushed = true;
            }
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir | Component::Prefix(_) => return None,
        }
    }
    pushed.then_some(out)
}

/// Inverse of [`path_under`]: the install path of a file below `root`
pub fn install_path(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?;
    Some(format!("/{}", relative.to_string_lossy()))
}
