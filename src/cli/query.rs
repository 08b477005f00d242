// src/cli/query.rs
//! Query commands: files, symbols, provides, requires, packages

use clap::{Args, Subcommand};
use rpmcat::{MatchMode, QueryKind, QueryRequest};

/// Options shared by every query kind
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Substring (or regular expression with --regexp) to search for
    pub pattern: String,

    /// Restrict the search to one tag
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Treat the pattern as a regular expression
    #[arg(short, long)]
    pub regexp: bool,

    /// Match without regard to case
    #[arg(short, long)]
    pub ignore_case: bool,

    /// Print only the number of matches
    #[arg(long)]
    pub count: bool,

    /// Terse output: no banners, one line per package
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum QueryCommands {
    /// Search file paths
    Files {
        #[command(flatten)]
        search: SearchArgs,

        /// Show permissions, owner and group of each file
        #[arg(short, long)]
        ownership: bool,

        /// Show build date and hardening flags of each file
        #[arg(short, long)]
        extra_info: bool,
    },

    /// Search dynamic symbols of packaged executables
    Symbols {
        #[command(flatten)]
        search: SearchArgs,
    },

    /// Search provided capabilities
    Provides {
        #[command(flatten)]
        search: SearchArgs,
    },

    /// Search required capabilities
    Requires {
        #[command(flatten)]
        search: SearchArgs,
    },

    /// Search package names
    Packages {
        #[command(flatten)]
        search: SearchArgs,
    },
}

impl QueryCommands {
    /// Build the engine request, falling back to `default_tag` when no
    /// `--tag` was given
    pub fn into_request(self, default_tag: Option<&str>) -> QueryRequest {
        let (kind, search, ownership, extra_info) = match self {
            QueryCommands::Files {
                search,
                ownership,
                extra_info,
            } => (QueryKind::Files, search, ownership, extra_info),
            QueryCommands::Symbols { search } => (QueryKind::Symbols, search, false, false),
            QueryCommands::Provides { search } => (QueryKind::Provides, search, false, false),
            QueryCommands::Requires { search } => (QueryKind::Requires, search, false, false),
            QueryCommands::Packages { search } => (QueryKind::Packages, search, false, false),
        };

        let mut request = QueryRequest::new(kind, search.pattern);
        request.mode = if search.regexp {
            MatchMode::Regex
        } else {
            MatchMode::Substring
        };
        request.ignore_case = search.ignore_case;
        request.tag = search.tag.or_else(|| default_tag.map(str::to_string));
        request.count_only = search.count;
        request.quiet = search.quiet;
        request.ownership = ownership;
        request.extra_info = extra_info;
        request
    }
}
