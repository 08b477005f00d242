// src/commands/query.rs
//! Catalogue search command

use anyhow::Result;
use rpmcat::QueryRequest;

/// Run a query and print the rendered result
pub fn cmd_query(db_path: &str, request: &QueryRequest) -> Result<()> {
    let conn = rpmcat::db::open(db_path)?;
    let outcome = rpmcat::query::execute(&conn, request)?;

    for line in rpmcat::query::render(request, &outcome) {
        println!("{}", line);
    }
    Ok(())
}
