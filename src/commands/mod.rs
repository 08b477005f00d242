// src/commands/mod.rs
//! Command handlers for the rpmcat CLI

mod import;
mod query;
mod report;

pub use import::{cmd_import, cmd_init, cmd_update};
pub use query::cmd_query;
pub use report::{cmd_setid, cmd_tags, cmd_updates};
