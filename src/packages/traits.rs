// src/packages/traits.rs

//! The interface the ingestion pipeline consumes package artifacts through

use crate::error::Result;
use std::path::Path;

/// Header fields identifying one binary package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageHeader {
    pub name: String,
    pub version: String,
    pub release: String,
    pub arch: String,
    /// Build timestamp in seconds since the epoch
    pub build_time: i64,
    /// Source package file name, e.g. `foo-bar-1.0-1.src.rpm`
    pub source_rpm: String,
    /// File name of the artifact itself
    pub filename: String,
}

impl PackageHeader {
    /// name-version-release
    pub fn nvr(&self) -> String {
        format!("{}-{}-{}", self.name, self.version, self.release)
    }
}

/// A file listed in the package header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFile {
    /// Absolute install path
    pub path: String,
    pub user: String,
    pub group: String,
    /// Full `st_mode`, including type and set-id bits
    pub mode: u32,
}

/// A binary package as seen by the ingestion pipeline
pub trait Artifact {
    /// Identifying header metadata
    fn header(&self) -> &PackageHeader;

    /// Declared capabilities, rendered as `name [op version]`, in header order
    fn provides(&self) -> &[String];

    /// Declared requirements, rendered as `name [op version]`, in header order
    fn requires(&self) -> &[String];

    /// Every file the header lists
    fn files(&self) -> &[PackageFile];

    /// Write the owner-executable regular files of the payload under `dest`
    ///
    /// Paths are laid out relative to `dest` (`/usr/bin/foo` becomes
    /// `dest/usr/bin/foo`). Returns the number of files written.
    fn explode(&self, dest: &Path) -> Result<usize>;
}
