// src/catalog/ingest.rs

//! Ingestion pipeline
//!
//! Turns one artifact into a Package row and its dependent file, dependency,
//! flags and symbol rows. Each artifact is persisted inside one transaction;
//! individual items inside it are best effort, so a bad file or capability
//! is logged and skipped without losing the rest of the package.

use crate::binary::{self, SecurityFlags};
use crate::catalog::cache::NameCaches;
use crate::db;
use crate::db::models::{DependencyEntry, DependencyKind, FileEntry, FlagsEntry, Package, SymbolEntry, Tag};
use crate::error::{Error, Result};
use crate::packages::archive_utils::{install_path, is_owner_executable};
use crate::packages::{Artifact, PackageFile, RpmPackage, ScratchDir};
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use rusqlite::{Connection, Transaction};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Requirements that every package carries and that say nothing about it:
/// rpmlib features, glibc and libgcc symbol versions, the dynamic loader
const REQUIRES_NOISE: &[&str] = &["rpmlib", "GLIBC", "GCC", "rtld"];

/// Result of importing one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Imported(ImportStats),
    /// The (tag, name, version, release, arch) tuple was already catalogued
    AlreadyPresent,
}

/// Rows written for one imported package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub package_id: i64,
    pub files: usize,
    pub requires: usize,
    pub provides: usize,
    pub executables: usize,
    pub symbols: usize,
}

/// Totals for a batch import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
    /// Not binary RPMs
    pub rejected: usize,
    pub failed: usize,
}

impl ImportSummary {
    pub fn total(&self) -> usize {
        self.imported + self.skipped + self.rejected + self.failed
    }
}

impl std::fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} imported, {} already present, {} rejected, {} failed",
            self.imported, self.skipped, self.rejected, self.failed
        )
    }
}

/// Strip the version suffix from a source RPM file name
///
/// The first `<word>-<digit>...` run is replaced by its word, so
/// `foo-bar-1.0-1.src.rpm` becomes `foo-bar`.
pub fn normalize_source_name(source_rpm: &str) -> String {
    static SOURCE_VERSION_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(\w+)(-[0-9]).*").unwrap());
    SOURCE_VERSION_RE.replacen(source_rpm, 1, "$1").into_owned()
}

/// Whether a requirement is loader, libc, compiler runtime or rpmlib noise
pub fn is_requires_noise(requirement: &str) -> bool {
    REQUIRES_NOISE.iter().any(|noise| requirement.contains(noise))
}

/// Drop noise requirements and collapse consecutive repeats
pub fn filter_requires(requires: &[String]) -> Vec<&str> {
    collapse_repeats(
        requires
            .iter()
            .map(String::as_str)
            .filter(|r| !is_requires_noise(r)),
    )
}

/// Collapse runs of identical adjacent entries into one
pub fn collapse_repeats<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::new();
    for item in items {
        if out.last() != Some(&item) {
            out.push(item);
        }
    }
    out
}

/// Keep going after a per-item failure unless the store itself is gone
fn best_effort<T>(what: &str, result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            warn!("Skipping {}: {}", what, e);
            Ok(None)
        }
    }
}

/// Drives the pipeline and owns the name caches for the run
#[derive(Debug, Default)]
pub struct Importer {
    caches: NameCaches,
    show_progress: bool,
}

impl Importer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw a progress bar during batch imports
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Create `tag` and import every artifact found under `path`
    pub fn import_directory(
        &mut self,
        conn: &mut Connection,
        tag_name: &str,
        path: &Path,
        update_path: &Path,
    ) -> Result<ImportSummary> {
        for dir in [path, update_path] {
            if !dir.is_dir() {
                return Err(Error::InvalidPath(format!(
                    "{} does not exist or is not a directory",
                    dir.display()
                )));
            }
        }

        let artifacts = collect_artifacts(path)?;
        if artifacts.is_empty() {
            return Err(Error::InvalidPath(format!(
                "No rpm files found in {} or its subdirectories",
                path.display()
            )));
        }

        let mut tag = Tag::new(
            tag_name.to_string(),
            path.to_string_lossy().into_owned(),
            update_path.to_string_lossy().into_owned(),
        );
        tag.insert(conn)?;
        info!(
            "Created tag {} with {} candidate files from {}",
            tag_name,
            artifacts.len(),
            path.display()
        );

        self.import_files(conn, &tag, &artifacts, false)
    }

    /// Import everything in the tag's update path that is not yet catalogued
    pub fn import_updates(&mut self, conn: &mut Connection, tag_name: &str) -> Result<ImportSummary> {
        let tag = Tag::require(conn, tag_name)?;
        let update_path = PathBuf::from(&tag.update_path);
        if !update_path.is_dir() {
            return Err(Error::InvalidPath(format!(
                "Update path {} of tag {} is not a directory",
                update_path.display(),
                tag_name
            )));
        }

        let artifacts = collect_artifacts(&update_path)?;
        info!(
            "Found {} candidate update files for tag {}",
            artifacts.len(),
            tag_name
        );
        self.import_files(conn, &tag, &artifacts, true)
    }

    /// Validate, parse and import a single RPM file into an existing tag
    pub fn import_file(
        &mut self,
        conn: &mut Connection,
        tag: &Tag,
        path: &Path,
        is_update: bool,
    ) -> Result<ImportOutcome> {
        RpmPackage::validate_path(path)?;
        let rpm = RpmPackage::open(path)?;
        self.import_artifact(conn, tag, &rpm, is_update)
    }

    fn import_files(
        &mut self,
        conn: &mut Connection,
        tag: &Tag,
        paths: &[PathBuf],
        is_update: bool,
    ) -> Result<ImportSummary> {
        let progress = self.progress_bar(paths.len() as u64);
        let mut summary = ImportSummary::default();

        for path in paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            progress.set_message(name);

            match self.import_file(conn, tag, path, is_update) {
                Ok(ImportOutcome::Imported(_)) => summary.imported += 1,
                Ok(ImportOutcome::AlreadyPresent) => summary.skipped += 1,
                Err(e) if e.is_fatal() => {
                    progress.abandon_with_message("aborted");
                    error!("Fatal error importing {}: {}", path.display(), e);
                    return Err(e);
                }
                Err(e) if e.is_user_error() => {
                    warn!("{}", e);
                    summary.rejected += 1;
                }
                Err(e) => {
                    warn!("Failed to import {}: {}", path.display(), e);
                    summary.failed += 1;
                }
            }
            progress.inc(1);
        }

        progress.finish_and_clear();
        info!("Tag {}: {}", tag.name, summary);
        Ok(summary)
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg:30!} ({pos}/{len}) [{bar:40.green/dim}] {percent}%")
        {
            bar.set_style(style.progress_chars("##-"));
        }
        bar
    }

    /// Import one artifact into `tag`
    ///
    /// Returns [`ImportOutcome::AlreadyPresent`] without touching the store
    /// when the package tuple is already catalogued in the tag.
    pub fn import_artifact(
        &mut self,
        conn: &mut Connection,
        tag: &Tag,
        artifact: &dyn Artifact,
        is_update: bool,
    ) -> Result<ImportOutcome> {
        let tag_id = tag.id.ok_or_else(|| Error::UnknownTag(tag.name.clone()))?;
        let header = artifact.header();

        if Package::find_existing(
            conn,
            tag_id,
            &header.name,
            &header.version,
            &header.release,
            &header.arch,
        )?
        .is_some()
        {
            info!("{} is already in tag {}, skipping", header.filename, tag.name);
            return Ok(ImportOutcome::AlreadyPresent);
        }

        let caches = &mut self.caches;
        let result = db::transaction(conn, |tx| {
            let mut package = Package {
                id: None,
                tag_id,
                name: header.name.clone(),
                version: header.version.clone(),
                release: header.release.clone(),
                build_time: header.build_time,
                arch: header.arch.clone(),
                source_name: normalize_source_name(&header.source_rpm),
                filename: header.filename.clone(),
                is_update,
            };
            let package_id = package.insert(tx)?;

            let mut stats = ImportStats {
                package_id,
                ..Default::default()
            };
            stats.files = persist_files(tx, caches, tag_id, package_id, artifact)?;
            stats.requires = persist_dependencies(
                tx,
                caches,
                DependencyKind::Requires,
                tag_id,
                package_id,
                filter_requires(artifact.requires()),
            )?;
            stats.provides = persist_dependencies(
                tx,
                caches,
                DependencyKind::Provides,
                tag_id,
                package_id,
                collapse_repeats(artifact.provides().iter().map(String::as_str)),
            )?;
            let (executables, symbols) =
                persist_binaries(tx, caches, tag_id, package_id, artifact)?;
            stats.executables = executables;
            stats.symbols = symbols;
            Ok(stats)
        });

        match result {
            Ok(stats) => {
                info!(
                    "Imported {} into {} ({} files, {} executables, {} symbols)",
                    header.nvr(),
                    tag.name,
                    stats.files,
                    stats.executables,
                    stats.symbols
                );
                Ok(ImportOutcome::Imported(stats))
            }
            Err(e) => {
                // The rollback may have discarded names the caches still map
                self.caches.clear();
                Err(e)
            }
        }
    }
}

/// Insert a FileEntry for every file in the header
fn persist_files(
    tx: &Transaction,
    caches: &mut NameCaches,
    tag_id: i64,
    package_id: i64,
    artifact: &dyn Artifact,
) -> Result<usize> {
    let mut count = 0;
    for file in artifact.files() {
        let result = insert_file(tx, caches, tag_id, package_id, file);
        if best_effort(&format!("file {}", file.path), result)?.is_some() {
            count += 1;
        }
    }
    Ok(count)
}

fn insert_file(
    tx: &Transaction,
    caches: &mut NameCaches,
    tag_id: i64,
    package_id: i64,
    file: &PackageFile,
) -> Result<i64> {
    let user_id = caches.users.resolve(tx, &file.user)?;
    let group_id = caches.groups.resolve(tx, &file.group)?;
    FileEntry::new(tag_id, package_id, user_id, group_id, file.path.clone(), file.mode).insert(tx)
}

fn persist_dependencies(
    tx: &Transaction,
    caches: &mut NameCaches,
    kind: DependencyKind,
    tag_id: i64,
    package_id: i64,
    names: Vec<&str>,
) -> Result<usize> {
    let cache = match kind {
        DependencyKind::Provides => &mut caches.provides,
        DependencyKind::Requires => &mut caches.requires,
    };

    let mut count = 0;
    for name in names {
        let result = cache
            .resolve(tx, name)
            .and_then(|name_id| DependencyEntry::new(kind, tag_id, package_id, name_id).insert(tx));
        if best_effort(&format!("{} {}", kind.table(), name), result)?.is_some() {
            count += 1;
        }
    }
    Ok(count)
}

/// Explode the payload and record flags and symbols for every ELF executable
///
/// Returns (executables classified, symbol rows written).
fn persist_binaries(
    tx: &Transaction,
    caches: &mut NameCaches,
    tag_id: i64,
    package_id: i64,
    artifact: &dyn Artifact,
) -> Result<(usize, usize)> {
    let nvr = artifact.header().nvr();
    let scratch = ScratchDir::new()?;
    if let Err(e) = artifact.explode(scratch.path()) {
        warn!("Could not unpack {}: {}", nvr, e);
        return Ok((0, 0));
    }

    let mut executables = 0;
    let mut symbol_rows = 0;

    for entry in WalkDir::new(scratch.path())
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let mode = match entry.metadata() {
            Ok(metadata) => metadata.permissions().mode(),
            Err(_) => continue,
        };
        if !is_owner_executable(mode) {
            continue;
        }

        let content = match std::fs::read(entry.path()) {
            Ok(content) => content,
            Err(e) => {
                warn!("Could not read {}: {}", entry.path().display(), e);
                continue;
            }
        };
        if !binary::is_elf(&content) {
            continue;
        }

        let Some(path) = install_path(scratch.path(), entry.path()) else {
            continue;
        };
        let Some(file_id) = FileEntry::find_id(tx, tag_id, package_id, &path)? else {
            warn!("{} in {} has no file entry, skipping", path, nvr);
            continue;
        };

        let (flags, symbols) = match binary::inspect(&content) {
            Ok(structure) => (
                binary::classify(&structure),
                binary::extract_symbols(&structure.global_dynamic_symbols),
            ),
            Err(e) => {
                warn!("Could not inspect {} in {}: {}", path, nvr, e);
                (SecurityFlags::unparsable(), Vec::new())
            }
        };
        debug!("{}: {:?}, {} symbols", path, flags, symbols.len());

        if best_effort(
            &format!("flags of {}", path),
            FlagsEntry::new(tag_id, package_id, file_id, flags).insert(tx),
        )?
        .is_some()
        {
            executables += 1;
        }

        for symbol in &symbols {
            let result = caches
                .symbols
                .resolve(tx, symbol)
                .and_then(|name_id| SymbolEntry::new(tag_id, package_id, file_id, name_id).insert(tx));
            if best_effort(&format!("symbol {} of {}", symbol, path), result)?.is_some() {
                symbol_rows += 1;
            }
        }
    }

    Ok((executables, symbol_rows))
}

/// `*.rpm` files in `dir`, or in its immediate subdirectories when `dir`
/// holds none, sorted by path
pub fn collect_artifacts(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = rpm_files_in(dir)?;
    if found.is_empty() {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                found.extend(rpm_files_in(&entry.path())?);
            }
        }
    }
    found.sort();
    Ok(found)
}

fn rpm_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "rpm") {
            files.push(path);
        }
    }
    Ok(files)
}
