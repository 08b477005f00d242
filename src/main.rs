// src/main.rs

use anyhow::Result;
use clap::{CommandFactory, Parser};
use rpmcat::config::Config;
use rpmcat::query::report::SetIdKind;
use tracing::debug;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise info, or debug with --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let config = Config::resolve(cli.config.as_deref())?;
    let db_path = cli
        .db_path
        .unwrap_or_else(|| config.database.path.to_string_lossy().into_owned());
    debug!("Using catalogue {}", db_path);

    match cli.command {
        Some(Commands::Init) => commands::cmd_init(&db_path),
        Some(Commands::Import {
            tag,
            path,
            update_path,
            no_progress,
        }) => commands::cmd_import(
            &db_path,
            &tag,
            &path,
            &update_path,
            config.import.progress && !no_progress,
        ),
        Some(Commands::Update { tag, no_progress }) => {
            commands::cmd_update(&db_path, &tag, config.import.progress && !no_progress)
        }
        Some(Commands::Query(query)) => {
            let request = query.into_request(config.query.default_tag.as_deref());
            commands::cmd_query(&db_path, &request)
        }
        Some(Commands::Tags) => commands::cmd_tags(&db_path),
        Some(Commands::Updates { tag }) => commands::cmd_updates(&db_path, &tag),
        Some(Commands::Suid { tag }) => commands::cmd_setid(&db_path, &tag, SetIdKind::Suid),
        Some(Commands::Sgid { tag }) => commands::cmd_setid(&db_path, &tag, SetIdKind::Sgid),
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "rpmcat", &mut std::io::stdout());
            Ok(())
        }
        None => {
            // No command provided, show help
            println!("rpmcat v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'rpmcat --help' for usage information");
            Ok(())
        }
    }
}
