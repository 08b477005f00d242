// src/db/schema.rs

//! Database schema definitions and migrations for the catalogue
//!
//! The schema is a small star: `packages` per tag, fact tables hanging off
//! packages (`files`, `provides`, `requires`, `symbols`, `flags`), and five
//! text dimension tables shared by every tag.

use crate::error::Result;
use rusqlite::Connection;
use tracing::{debug, info};

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the schema version tracking table
fn init_schema_version(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;
    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    init_schema_version(conn)?;

    let version = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    Ok(version)
}

/// Set the schema version
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Apply all pending migrations to bring the database up to date
pub fn migrate(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;
    debug!("Current schema version: {}", current_version);

    if current_version >= SCHEMA_VERSION {
        return Ok(());
    }

    for version in (current_version + 1)..=SCHEMA_VERSION {
        info!("Applying migration to version {}", version);
        apply_migration(conn, version)?;
        set_schema_version(conn, version)?;
    }

    info!("Schema migration complete. Now at version {}", SCHEMA_VERSION);
    Ok(())
}

/// Apply a specific migration version
fn apply_migration(conn: &Connection, version: i32) -> Result<()> {
    match version {
        1 => migrate_v1(conn),
        _ => Err(crate::Error::InitError(format!(
            "Unknown migration version: {}",
            version
        ))),
    }
}

/// Initial schema - Version 1
fn migrate_v1(conn: &Connection) -> Result<()> {
    debug!("Creating schema version 1");

    conn.execute_batch(
        "
        -- Tags: one named import collection per source directory
        CREATE TABLE tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            path TEXT NOT NULL,
            update_path TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        -- Packages: one imported binary RPM
        CREATE TABLE packages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tag_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            version TEXT NOT NULL,
            release TEXT NOT NULL,
            build_time INTEGER NOT NULL DEFAULT 0,
            arch TEXT NOT NULL,
            source_name TEXT NOT NULL DEFAULT '',
            filename TEXT NOT NULL,
            is_update INTEGER NOT NULL DEFAULT 0,
            UNIQUE(tag_id, name, version, release, arch),
            FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE
        );

        CREATE INDEX idx_packages_name ON packages(name);

        -- Name dimensions
        CREATE TABLE user_names (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE group_names (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE symbol_names (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE provides_names (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE requires_names (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        -- Files shipped by a package
        CREATE TABLE files (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tag_id INTEGER NOT NULL,
            package_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            group_id INTEGER NOT NULL,
            path TEXT NOT NULL,
            is_suid INTEGER NOT NULL DEFAULT 0,
            is_sgid INTEGER NOT NULL DEFAULT 0,
            perms INTEGER NOT NULL,
            FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE,
            FOREIGN KEY (package_id) REFERENCES packages(id) ON DELETE CASCADE,
            FOREIGN KEY (user_id) REFERENCES user_names(id),
            FOREIGN KEY (group_id) REFERENCES group_names(id)
        );

        CREATE INDEX idx_files_path ON files(path);
        CREATE INDEX idx_files_package_id ON files(package_id);

        -- Declared capabilities
        CREATE TABLE provides (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tag_id INTEGER NOT NULL,
            package_id INTEGER NOT NULL,
            name_id INTEGER NOT NULL,
            FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE,
            FOREIGN KEY (package_id) REFERENCES packages(id) ON DELETE CASCADE,
            FOREIGN KEY (name_id) REFERENCES provides_names(id)
        );

        CREATE INDEX idx_provides_package_id ON provides(package_id);
        CREATE INDEX idx_provides_name_id ON provides(name_id);

        CREATE TABLE requires (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tag_id INTEGER NOT NULL,
            package_id INTEGER NOT NULL,
            name_id INTEGER NOT NULL,
            FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE,
            FOREIGN KEY (package_id) REFERENCES packages(id) ON DELETE CASCADE,
            FOREIGN KEY (name_id) REFERENCES requires_names(id)
        );

        CREATE INDEX idx_requires_package_id ON requires(package_id);
        CREATE INDEX idx_requires_name_id ON requires(name_id);

        -- Dynamic symbols of ELF files
        CREATE TABLE symbols (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tag_id INTEGER NOT NULL,
            package_id INTEGER NOT NULL,
            file_id INTEGER NOT NULL,
            name_id INTEGER NOT NULL,
            FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE,
            FOREIGN KEY (package_id) REFERENCES packages(id) ON DELETE CASCADE,
            FOREIGN KEY (file_id) REFERENCES files(id) ON DELETE CASCADE,
            FOREIGN KEY (name_id) REFERENCES symbol_names(id)
        );

        CREATE INDEX idx_symbols_file_id ON symbols(file_id);
        CREATE INDEX idx_symbols_name_id ON symbols(name_id);

        -- Hardening flags of ELF files
        CREATE TABLE flags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tag_id INTEGER NOT NULL,
            package_id INTEGER NOT NULL,
            file_id INTEGER NOT NULL,
            relro INTEGER NOT NULL DEFAULT 0,
            ssp INTEGER NOT NULL DEFAULT 0,
            pie INTEGER NOT NULL DEFAULT 0,
            nx INTEGER NOT NULL DEFAULT 0,
            fortify INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE,
            FOREIGN KEY (package_id) REFERENCES packages(id) ON DELETE CASCADE,
            FOREIGN KEY (file_id) REFERENCES files(id) ON DELETE CASCADE
        );

        CREATE INDEX idx_flags_file_id ON flags(file_id);
        ",
    )?;

    info!("Schema version 1 created successfully");
    Ok(())
}
