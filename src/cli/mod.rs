// src/cli/mod.rs
//! CLI definitions for pulp-images
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! - `images` - Resolve the next stable image and record it for CI
//! - `readyz` - Readiness probe against the API status endpoint
//! - `wait-postgres` - Block until the database accepts connections

use clap::{Parser, Subcommand};

mod images;
mod probe;

pub use images::ImagesArgs;
pub use probe::{ReadyzArgs, WaitPostgresArgs};

#[derive(Parser)]
#[command(name = "pulp-images")]
#[command(author = "Pulp Project")]
#[command(version)]
#[command(about = "Image release resolution and container probes for Pulp CI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve compatible plugin releases and append a stable image to the CI vars
    Images(ImagesArgs),

    /// Check the API status endpoint; exit code names the first unmet condition
    Readyz(ReadyzArgs),

    /// Wait until postgres accepts TCP connections
    WaitPostgres(WaitPostgresArgs),
}
