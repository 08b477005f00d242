// src/db/mod.rs

//! Database layer for the rpmcat catalogue
//!
//! All catalogue state lives in a single SQLite file. This module owns
//! connection setup, schema migration, and the transaction helper used by
//! the ingestion pipeline.

pub mod models;
pub mod schema;

use crate::error::{Error, Result};
use regex::Regex;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Create (if needed) and migrate the database at `db_path`
pub fn init(db_path: &str) -> Result<()> {
    info!("Initializing catalogue database at: {}", db_path);

    if let Some(parent) = Path::new(db_path).parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::InitError(format!(
                "Failed to create database directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let conn = Connection::open(db_path)
        .map_err(|e| Error::InitError(format!("Failed to create database: {}", e)))?;
    configure(&conn)?;
    schema::migrate(&conn)?;
    Ok(())
}

/// Open an existing database
///
/// The schema is migrated forward if it is behind, so a database created by
/// an older build stays usable.
pub fn open(db_path: &str) -> Result<Connection> {
    if !Path::new(db_path).exists() {
        return Err(Error::InitError(format!(
            "Database not found at {} (run `rpmcat init` first)",
            db_path
        )));
    }

    let conn = Connection::open(db_path)
        .map_err(|e| Error::InitError(format!("Failed to open database: {}", e)))?;
    configure(&conn)?;
    schema::migrate(&conn)?;
    debug!("Opened database {}", db_path);
    Ok(conn)
}

/// Open a fresh in-memory catalogue, used by tests and dry runs
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure(&conn)?;
    schema::migrate(&conn)?;
    Ok(conn)
}

/// Run `f` inside a transaction, committing on success
pub fn transaction<T, F>(conn: &mut Connection, f: F) -> Result<T>
where
    F: FnOnce(&Transaction) -> Result<T>,
{
    let tx = conn.transaction()?;
    let result = f(&tx)?;
    tx.commit()?;
    Ok(result)
}

/// Per-connection settings plus the `regexp()` SQL function
fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    register_regexp(conn)?;
    Ok(())
}

/// Register `regexp(pattern, text)` so `text REGEXP pattern` works in queries
///
/// The compiled pattern is cached as auxiliary data on the statement, so a
/// query compiles its regex once rather than once per row.
fn register_regexp(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "regexp",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let re: Arc<Regex> = ctx.get_or_create_aux(0, |vr| -> std::result::Result<_, BoxError> {
                Ok(Regex::new(vr.as_str()?)?)
            })?;
            let text = match ctx.get_raw(1) {
                ValueRef::Null => return Ok(false),
                value => value
                    .as_str()
                    .map_err(|e| rusqlite::Error::UserFunctionError(e.into()))?,
            };
            Ok(re.is_match(text))
        },
    )?;
    Ok(())
}
