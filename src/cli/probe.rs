// src/cli/probe.rs
//! Container probe commands

use clap::Args;

#[derive(Args, Debug)]
pub struct ReadyzArgs {
    /// Status endpoint path, e.g. /pulp/api/v3/status/
    pub status_path: String,

    /// API base URL
    #[arg(long, default_value = "http://localhost:24817")]
    pub base_url: String,
}

#[derive(Args, Debug)]
pub struct WaitPostgresArgs {
    /// Connection attempts before giving up
    #[arg(long, default_value = "100")]
    pub attempts: u32,

    /// Seconds between attempts
    #[arg(long, default_value = "3")]
    pub interval_secs: u64,
}
