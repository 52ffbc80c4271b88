// src/probe/mod.rs

//! Container health probes
//!
//! - Readiness: query the API status endpoint and map it to an exit code
//! - Postgres wait: block until the database accepts TCP connections

mod postgres;
mod readiness;

pub use postgres::{PostgresWait, DEFAULT_ATTEMPTS, DEFAULT_INTERVAL, DEFAULT_POSTGRES_PORT};
pub use readiness::{
    ConnectionStatus, Readiness, ReadinessProbe, StatusResponse, DEFAULT_STATUS_BASE_URL,
};
