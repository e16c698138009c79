// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn flag(name: &'static str, short: char, help: &'static str) -> Arg {
    Arg::new(name)
        .short(short)
        .long(name)
        .action(ArgAction::SetTrue)
        .help(help)
}

fn build_cli() -> Command {
    Command::new("bpm-repo")
        .version(env!("CARGO_PKG_VERSION"))
        .author("BPM Utils Contributors")
        .about("Manage BPM repositories and databases")
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Show informational log output"),
        )
        .subcommand(
            Command::new("create-repo")
                .visible_alias("c")
                .about("Create a new BPM repository")
                .arg(Arg::new("name").long("name").required(true).help("Repository name"))
                .arg(
                    Arg::new("description")
                        .long("description")
                        .default_value("")
                        .help("Repository description"),
                ),
        )
        .subcommand(
            Command::new("update-db")
                .visible_alias("u")
                .about("Update source and binary databases in the current repository"),
        )
        .subcommand(
            Command::new("list")
                .visible_alias("l")
                .about("List packages and their binary status"),
        )
        .subcommand(
            Command::new("check-versions")
                .visible_alias("v")
                .about("Check packages for newer upstream versions")
                .arg(flag("show-skipped", 'v', "Show ignored packages and packages without a check script"))
                .arg(flag("force", 'f', "Bypass the version cache"))
                .arg(flag("apply", 'a', "Apply new versions to packages"))
                .arg(
                    Arg::new("packages")
                        .num_args(0..)
                        .help("Package directories under source/ to check"),
                ),
        )
        .subcommand(
            Command::new("checksums")
                .about("Resolve download checksums for a package directory")
                .arg(Arg::new("directory").required(true).help("Package directory"))
                .arg(
                    Arg::new("write")
                        .long("write")
                        .action(ArgAction::SetTrue)
                        .help("Store resolved checksums in pkg.info"),
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

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("bpm-repo.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
