// src/packages/mod.rs

//! Package artifacts
//!
//! The ingestion pipeline sees packages only through the [`Artifact`] trait.
//! [`RpmPackage`] implements it for binary RPMs; payload members are read by
//! the CPIO reader and written to a [`ScratchDir`].

pub mod archive_utils;
pub mod cpio;
pub mod rpm;
pub mod scratch;
pub mod traits;

pub use rpm::RpmPackage;
pub use scratch::ScratchDir;
pub use traits::{Artifact, PackageFile, PackageHeader};
