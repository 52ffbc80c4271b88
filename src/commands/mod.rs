// src/commands/mod.rs
//! Command handlers for the pulp-images CLI

mod images;
mod probe;

pub use images::cmd_images;
pub use probe::{cmd_readyz, cmd_wait_postgres};
