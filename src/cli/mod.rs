// src/cli/mod.rs
//! CLI definitions for rpmcat
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! - `init` - Create the catalogue database
//! - `import` / `update` - Catalogue a release directory or its updates
//! - `query` - Search files, symbols, capabilities and packages
//! - `tags`, `updates`, `suid`, `sgid` - Fixed reports
//! - `completions` - Shell completion scripts

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

mod query;

pub use query::QueryCommands;

#[derive(Parser)]
#[command(name = "rpmcat")]
#[command(author = "rpmcat Contributors")]
#[command(version)]
#[command(about = "Catalogue RPM packages and query their files, symbols and hardening flags", long_about = None)]
pub struct Cli {
    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    pub db_path: Option<String>,

    /// Configuration file (default: /etc/rpmcat.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the catalogue database
    Init,

    /// Create a tag and import every RPM found in a directory
    Import {
        /// Name of the new tag
        tag: String,

        /// Directory holding the release's RPMs
        path: PathBuf,

        /// Directory that will hold the release's updates
        update_path: PathBuf,

        /// Do not draw a progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Import new RPMs from a tag's update directory
    Update {
        /// Tag to update
        tag: String,

        /// Do not draw a progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Search the catalogue
    #[command(subcommand)]
    Query(QueryCommands),

    /// List tags and their package counts
    Tags,

    /// List packages imported from a tag's update directory
    Updates {
        /// Tag to report on
        tag: String,
    },

    /// List SUID files in a tag
    Suid {
        /// Tag to report on
        tag: String,
    },

    /// List SGID files in a tag
    Sgid {
        /// Tag to report on
        tag: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
