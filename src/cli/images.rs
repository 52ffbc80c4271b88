// src/cli/images.rs
//! Stable image release command

use clap::Args;

#[derive(Args, Debug)]
pub struct ImagesArgs {
    /// Image family: pulp or galaxy (default: from CI_TEST, else pulp)
    #[arg(short, long, value_parser = ["pulp", "galaxy"])]
    pub family: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Number of newest core releases to probe (overrides the config file)
    #[arg(short = 'n', long)]
    pub releases_to_check: Option<usize>,

    /// Workspace holding the .ci directory
    #[arg(short, long, env = "GITHUB_WORKSPACE", default_value = ".")]
    pub workspace: String,

    /// Package index JSON API root (overrides the config file)
    #[arg(long)]
    pub index_url: Option<String>,

    /// Resolve and print the plan without writing any files
    #[arg(long)]
    pub dry_run: bool,
}
