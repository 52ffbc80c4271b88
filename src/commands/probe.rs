// src/commands/probe.rs
//! Container probe commands
//!
//! Both handlers return the process exit code instead of an error when the
//! probed service is simply not ready.

use anyhow::Result;
use pulp_images::probe::{PostgresWait, ReadinessProbe};
use std::time::Duration;
use tracing::{error, warn};

/// Check the API status endpoint
pub fn cmd_readyz(status_path: &str, base_url: &str) -> Result<i32> {
    println!("Readiness probe checking {}", status_path);

    let redis_expected = std::env::var_os("REDIS_SERVICE_HOST").is_some_and(|v| !v.is_empty());
    let probe = ReadinessProbe::new(base_url)?;

    match probe.check(status_path, redis_expected) {
        Ok(readiness) => {
            if !readiness.is_ready() {
                warn!("Not ready: {}", readiness);
            }
            Ok(readiness.exit_code())
        }
        Err(e) => {
            error!("Readiness probe failed: {}", e);
            Ok(1)
        }
    }
}

/// Wait for postgres named by the service environment variables
pub fn cmd_wait_postgres(attempts: u32, interval_secs: u64) -> Result<i32> {
    let wait = PostgresWait::from_env()?
        .with_attempts(attempts)
        .with_interval(Duration::from_secs(interval_secs));

    println!("Waiting on postgresql to start...");
    match wait.wait() {
        Ok(_) => {
            println!("Postgres started!");
            Ok(0)
        }
        Err(e) => {
            error!("{}", e);
            println!("Unable to reach postgres on port {}", wait.port());
            Ok(1)
        }
    }
}
