// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: database path
fn db_path_arg() -> Arg {
    Arg::new("db_path")
        .short('d')
        .long("db-path")
        .value_name("PATH")
        .help("Database path (default: from config, else /var/lib/rpmcat/catalog.db)")
}

/// Common argument: tag name
fn tag_arg() -> Arg {
    Arg::new("tag").required(true).help("Tag name")
}

/// Common argument: suppress the import progress bar
fn no_progress_arg() -> Arg {
    Arg::new("no_progress")
        .long("no-progress")
        .action(clap::ArgAction::SetTrue)
        .help("Do not draw a progress bar")
}

/// Query subcommand with the options every search kind shares
fn query_kind(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(Arg::new("pattern").required(true).help("Substring or regular expression"))
        .arg(Arg::new("tag").short('t').long("tag").help("Restrict the search to one tag"))
        .arg(
            Arg::new("regexp")
                .short('r')
                .long("regexp")
                .action(clap::ArgAction::SetTrue)
                .help("Treat the pattern as a regular expression"),
        )
        .arg(
            Arg::new("ignore_case")
                .short('i')
                .long("ignore-case")
                .action(clap::ArgAction::SetTrue)
                .help("Match without regard to case"),
        )
        .arg(
            Arg::new("count")
                .long("count")
                .action(clap::ArgAction::SetTrue)
                .help("Print only the number of matches"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(clap::ArgAction::SetTrue)
                .help("Terse output"),
        )
}

fn build_cli() -> Command {
    Command::new("rpmcat")
        .version(env!("CARGO_PKG_VERSION"))
        .author("rpmcat Contributors")
        .about("Catalogue RPM packages and query their files, symbols and hardening flags")
        .subcommand_required(false)
        .arg(db_path_arg())
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (default: /etc/rpmcat.toml when present)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .subcommand(Command::new("init").about("Initialize the catalogue database"))
        .subcommand(
            Command::new("import")
                .about("Create a tag and import every RPM found in a directory")
                .arg(tag_arg())
                .arg(Arg::new("path").required(true).help("Directory holding the release's RPMs"))
                .arg(
                    Arg::new("update_path")
                        .required(true)
                        .help("Directory that will hold the release's updates"),
                )
                .arg(no_progress_arg()),
        )
        .subcommand(
            Command::new("update")
                .about("Import new RPMs from a tag's update directory")
                .arg(tag_arg())
                .arg(no_progress_arg()),
        )
        .subcommand(
            Command::new("query")
                .about("Search the catalogue")
                .subcommand(
                    query_kind("files", "Search file paths")
                        .arg(
                            Arg::new("ownership")
                                .short('o')
                                .long("ownership")
                                .action(clap::ArgAction::SetTrue)
                                .help("Show permissions, owner and group"),
                        )
                        .arg(
                            Arg::new("extra_info")
                                .short('e')
                                .long("extra-info")
                                .action(clap::ArgAction::SetTrue)
                                .help("Show build date and hardening flags"),
                        ),
                )
                .subcommand(query_kind("symbols", "Search dynamic symbols of packaged executables"))
                .subcommand(query_kind("provides", "Search provided capabilities"))
                .subcommand(query_kind("requires", "Search required capabilities"))
                .subcommand(query_kind("packages", "Search package names")),
        )
        .subcommand(Command::new("tags").about("List tags and their package counts"))
        .subcommand(
            Command::new("updates")
                .about("List packages imported from a tag's update directory")
                .arg(tag_arg()),
        )
        .subcommand(Command::new("suid").about("List SUID files in a tag").arg(tag_arg()))
        .subcommand(Command::new("sgid").about("List SGID files in a tag").arg(tag_arg()))
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "zsh", "fish", "powershell"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    // Generate main man page
    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("rpmcat.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
        return;
    }

    println!("cargo:warning=Man page generated at {}", man_path.display());
}
