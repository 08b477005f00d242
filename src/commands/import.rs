// src/commands/import.rs

//! Catalogue construction commands

use anyhow::{Context, Result};
use rpmcat::{ImportSummary, Importer};
use std::path::Path;
use tracing::info;

/// Initialize the catalogue database
pub fn cmd_init(db_path: &str) -> Result<()> {
    info!("Initializing rpmcat database at: {}", db_path);
    rpmcat::db::init(db_path)?;
    println!("Database initialized successfully at: {}", db_path);
    Ok(())
}

/// Create `tag` from a release directory and import its RPMs
pub fn cmd_import(
    db_path: &str,
    tag: &str,
    path: &Path,
    update_path: &Path,
    progress: bool,
) -> Result<()> {
    let mut conn = rpmcat::db::open(db_path)?;
    let mut importer = Importer::new().with_progress(progress);

    let summary = importer
        .import_directory(&mut conn, tag, path, update_path)
        .with_context(|| format!("Failed to import {} into tag {}", path.display(), tag))?;

    print_summary(tag, &summary);
    Ok(())
}

/// Import new RPMs from the tag's update directory
pub fn cmd_update(db_path: &str, tag: &str, progress: bool) -> Result<()> {
    let mut conn = rpmcat::db::open(db_path)?;
    let mut importer = Importer::new().with_progress(progress);

    let summary = importer
        .import_updates(&mut conn, tag)
        .with_context(|| format!("Failed to import updates for tag {}", tag))?;

    print_summary(tag, &summary);
    Ok(())
}

fn print_summary(tag: &str, summary: &ImportSummary) {
    println!("Tag {}: {}", tag, summary);
    if summary.rejected + summary.failed > 0 {
        println!("Run with --verbose or RUST_LOG=debug for details on skipped files.");
    }
}
