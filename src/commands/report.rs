// src/commands/report.rs

//! Report commands: tags, updates and set-id files

use anyhow::Result;
use rpmcat::query::report::{self, SetIdKind};

/// List all tags with their package counts
pub fn cmd_tags(db_path: &str) -> Result<()> {
    let conn = rpmcat::db::open(db_path)?;
    let tags = report::list_tags(&conn)?;

    if tags.is_empty() {
        println!("No tags defined.");
        println!("\nUse 'rpmcat import <tag> <path> <update-path>' to create one.");
        return Ok(());
    }

    println!("Tags ({}):", tags.len());
    for (tag, count) in &tags {
        println!("  {:<20} {:>6} packages  {}", tag.name, count, tag.path);
        println!("  {:<20} {:>6}           {}", "", "", tag.update_path);
    }
    Ok(())
}

/// List packages imported from the tag's update directory
pub fn cmd_updates(db_path: &str, tag: &str) -> Result<()> {
    let conn = rpmcat::db::open(db_path)?;
    let updates = report::list_updates(&conn, tag)?;

    if updates.is_empty() {
        println!("No updates imported for tag {}.", tag);
        return Ok(());
    }

    println!("Updates in tag {} ({}):", tag, updates.len());
    for filename in &updates {
        println!("  {}", filename);
    }
    Ok(())
}

/// List SUID or SGID files in a tag
pub fn cmd_setid(db_path: &str, tag: &str, kind: SetIdKind) -> Result<()> {
    let conn = rpmcat::db::open(db_path)?;
    let files = report::list_setid(&conn, tag, kind)?;

    if files.is_empty() {
        println!("No {} files in tag {}.", kind.as_str(), tag);
        return Ok(());
    }

    println!("{} files in tag {} ({}):", kind.as_str(), tag, files.len());
    for file in &files {
        println!("  {}", file);
    }
    Ok(())
}
