// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn images_command() -> Command {
    Command::new("images")
        .about("Resolve compatible plugin releases and append a stable image to the CI vars")
        .arg(
            Arg::new("family")
                .short('f')
                .long("family")
                .value_parser(["pulp", "galaxy"])
                .help("Image family (default: from CI_TEST, else pulp)"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Path to a TOML configuration file"),
        )
        .arg(
            Arg::new("releases_to_check")
                .short('n')
                .long("releases-to-check")
                .value_name("N")
                .help("Number of newest core releases to probe"),
        )
        .arg(
            Arg::new("workspace")
                .short('w')
                .long("workspace")
                .env("GITHUB_WORKSPACE")
                .default_value(".")
                .help("Workspace holding the .ci directory"),
        )
        .arg(
            Arg::new("index_url")
                .long("index-url")
                .value_name("URL")
                .help("Package index JSON API root"),
        )
        .arg(
            Arg::new("dry_run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Resolve and print the plan without writing any files"),
        )
}

fn build_cli() -> Command {
    Command::new("pulp-images")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Pulp Project")
        .about("Image release resolution and container probes for Pulp CI")
        .subcommand_required(true)
        .subcommand(images_command())
        .subcommand(
            Command::new("readyz")
                .about("Check the API status endpoint; exit code names the first unmet condition")
                .arg(
                    Arg::new("status_path")
                        .required(true)
                        .help("Status endpoint path, e.g. /pulp/api/v3/status/"),
                )
                .arg(
                    Arg::new("base_url")
                        .long("base-url")
                        .default_value("http://localhost:24817")
                        .help("API base URL"),
                ),
        )
        .subcommand(
            Command::new("wait-postgres")
                .about("Wait until postgres accepts TCP connections")
                .arg(
                    Arg::new("attempts")
                        .long("attempts")
                        .default_value("100")
                        .help("Connection attempts before giving up"),
                )
                .arg(
                    Arg::new("interval_secs")
                        .long("interval-secs")
                        .default_value("3")
                        .help("Seconds between attempts"),
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

    let man_path = man_dir.join("pulp-images.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
