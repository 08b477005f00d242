// src/packages/rpm.rs

//! Binary RPM artifacts backed by the `rpm` crate

use crate::compression;
use crate::error::{Error, Result};
use crate::packages::archive_utils::{
    MAX_EXTRACTION_FILE_SIZE, is_owner_executable, is_regular_file_mode, normalize_path,
    path_under,
};
use crate::packages::cpio::CpioReader;
use crate::packages::traits::{Artifact, PackageFile, PackageHeader};
use rpm::Package;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Lead magic every RPM file starts with
const RPM_MAGIC: [u8; 4] = [0xed, 0xab, 0xee, 0xdb];

/// A parsed binary RPM with its payload held in memory
pub struct RpmPackage {
    header: PackageHeader,
    provides: Vec<String>,
    requires: Vec<String>,
    files: Vec<PackageFile>,
    payload: Vec<u8>,
}

impl RpmPackage {
    /// Check that `path` names a binary RPM before parsing it
    ///
    /// The file must be called `*.rpm` (but not `*.src.rpm`) and start with
    /// the RPM lead magic.
    pub fn validate_path(path: &Path) -> Result<()> {
        let display = path.display().to_string();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if !file_name.ends_with(".rpm") || file_name.ends_with(".src.rpm") {
            return Err(Error::NotAnArtifact(display));
        }
        if !path.is_file() {
            return Err(Error::InvalidPath(format!("{} is not a regular file", display)));
        }

        let mut lead = [0u8; 4];
        let mut file = File::open(path)?;
        if file.read_exact(&mut lead).is_err() || lead != RPM_MAGIC {
            return Err(Error::NotAnArtifact(display));
        }
        Ok(())
    }

    /// Parse a package file
    pub fn open(path: &Path) -> Result<Self> {
        debug!("Parsing RPM package: {}", path.display());

        let file = File::open(path)?;
        let mut buf_reader = BufReader::new(file);
        let pkg = Package::parse(&mut buf_reader)
            .map_err(|e| Error::ParseError(format!("{}: {}", path.display(), e)))?;

        let field = |name: &str, value: std::result::Result<&str, rpm::Error>| {
            value
                .map(str::to_string)
                .map_err(|e| Error::ParseError(format!("{}: missing {}: {}", path.display(), name, e)))
        };

        let metadata = &pkg.metadata;
        let header = PackageHeader {
            name: field("name", metadata.get_name())?,
            version: field("version", metadata.get_version())?,
            release: field("release", metadata.get_release())?,
            arch: field("arch", metadata.get_arch())?,
            build_time: metadata
                .get_build_time()
                .map(|t| t as i64)
                .unwrap_or_default(),
            source_rpm: metadata
                .get_source_rpm()
                .map(str::to_string)
                .unwrap_or_default(),
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };

        let provides = metadata
            .get_provides()
            .map(|deps| deps.iter().map(render_dependency).collect())
            .unwrap_or_default();
        let requires = metadata
            .get_requires()
            .map(|deps| deps.iter().map(render_dependency).collect())
            .unwrap_or_default();

        let files = metadata
            .get_file_entries()
            .map(|entries| {
                entries
                    .into_iter()
                    .map(|entry| PackageFile {
                        path: entry.path.to_string_lossy().into_owned(),
                        user: entry.ownership.user,
                        group: entry.ownership.group,
                        mode: u32::from(entry.mode.raw_mode()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let rpm = Self {
            header,
            provides,
            requires,
            files,
            payload: pkg.content,
        };

        debug!(
            "Parsed RPM: {} ({} files, {} provides, {} requires)",
            rpm.header.nvr(),
            rpm.files.len(),
            rpm.provides.len(),
            rpm.requires.len()
        );
        Ok(rpm)
    }
}

impl Artifact for RpmPackage {
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
        self.explode_with_limit(dest, MAX_EXTRACTION_FILE_SIZE)
    }
}

impl RpmPackage {
    /// Write executable payload members under `dest`, skipping any larger
    /// than `size_limit` without buffering them
    fn explode_with_limit(&self, dest: &Path, size_limit: u64) -> Result<usize> {
        if self.payload.is_empty() {
            debug!("RPM {} has empty payload", self.header.nvr());
            return Ok(0);
        }

        let decoder = compression::payload_decoder(&self.payload)?;
        let mut cpio = CpioReader::new(decoder).with_size_limit(size_limit);
        // Hard links seen before the member carrying their data, by inode
        let mut pending_links: HashMap<u32, Vec<(PathBuf, u32)>> = HashMap::new();
        let mut written = 0;

        while let Some((entry, content)) = cpio
            .next_entry()
            .map_err(|e| Error::ParseError(format!("CPIO error: {}", e)))?
        {
            if !is_regular_file_mode(entry.mode) {
                continue;
            }
            if entry.oversized {
                warn!(
                    "Skipping oversized file '{}' ({} bytes) in {}",
                    entry.name,
                    entry.size,
                    self.header.nvr()
                );
                pending_links.remove(&entry.ino);
                continue;
            }

            let install_path = normalize_path(&entry.name);
            let Some(target) = path_under(dest, &install_path) else {
                warn!("Skipping unsafe payload path '{}'", entry.name);
                continue;
            };

            if entry.is_deferred_link() {
                pending_links
                    .entry(entry.ino)
                    .or_default()
                    .push((target, entry.mode));
                continue;
            }

            let links = if entry.nlink > 1 {
                pending_links.remove(&entry.ino).unwrap_or_default()
            } else {
                Vec::new()
            };
            for (path, mode) in std::iter::once((target, entry.mode)).chain(links) {
                if is_owner_executable(mode) {
                    write_executable(&path, mode, &content)?;
                    written += 1;
                }
            }
        }

        // Links whose data never arrived name an empty file
        for (path, mode) in pending_links.into_values().flatten() {
            if is_owner_executable(mode) {
                write_executable(&path, mode, &[])?;
                written += 1;
            }
        }

        debug!("Exploded {} executables from {}", written, self.header.nvr());
        Ok(written)
    }
}

fn write_executable(target: &Path, mode: u32, content: &[u8]) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(target, content)?;
    fs::set_permissions(target, fs::Permissions::from_mode((mode & 0o777) | 0o600))?;
    Ok(())
}

/// Render a dependency the way `rpm -q --requires` prints it
fn render_dependency(dep: &rpm::Dependency) -> String {
    let operator = flags_to_operator(dep.flags);
    if dep.version.is_empty() || operator.is_empty() {
        dep.name.clone()
    } else {
        format!("{} {} {}", dep.name, operator, dep.version)
    }
}

/// Convert RPM DependencyFlags to a comparison operator
fn flags_to_operator(flags: rpm::DependencyFlags) -> &'static str {
    use rpm::DependencyFlags;

    let less = flags.contains(DependencyFlags::LESS);
    let greater = flags.contains(DependencyFlags::GREATER);
    let equal = flags.contains(DependencyFlags::EQUAL);
    match (less, greater, equal) {
        (true, false, true) => "<=",
        (false, true, true) => ">=",
        (true, false, false) => "<",
        (false, true, false) => ">",
        (false, false, true) => "=",
        _ => "",
    }
}
