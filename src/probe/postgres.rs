// src/probe/postgres.rs

//! Wait for the database to accept connections before the API starts

use crate::error::{Error, Result};
use std::net::{TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_POSTGRES_PORT: u16 = 5432;
pub const DEFAULT_ATTEMPTS: u32 = 100;
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// TCP readiness wait for a postgres service
#[derive(Debug, Clone)]
pub struct PostgresWait {
    host: String,
    port: u16,
    attempts: u32,
    interval: Duration,
}

impl PostgresWait {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            attempts: DEFAULT_ATTEMPTS,
            interval: DEFAULT_INTERVAL,
        }
    }

    /// Build from `POSTGRES_SERVICE_HOST` and `POSTGRES_SERVICE_PORT`
    pub fn from_env() -> Result<Self> {
        Self::from_vars(
            std::env::var("POSTGRES_SERVICE_HOST").ok().as_deref(),
            std::env::var("POSTGRES_SERVICE_PORT").ok().as_deref(),
        )
    }

    /// Build from raw host and port values; the host is required
    pub fn from_vars(host: Option<&str>, port: Option<&str>) -> Result<Self> {
        let host = host
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::ConfigError("POSTGRES_SERVICE_HOST is not set".to_string()))?;
        Ok(Self::new(host, Self::parse_port(port)))
    }

    /// Port value, falling back to 5432 when absent or not a port number
    pub fn parse_port(value: Option<&str>) -> u16 {
        value
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_POSTGRES_PORT)
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Try to connect until it works or attempts run out
    ///
    /// Returns the attempt number that succeeded.
    pub fn wait(&self) -> Result<u32> {
        info!("Waiting on postgres at {}:{}", self.host, self.port);

        for attempt in 1..=self.attempts {
            if self.try_connect() {
                info!("Postgres accepted a connection after {} attempt(s)", attempt);
                return Ok(attempt);
            }
            debug!("Postgres attempt {}/{} failed", attempt, self.attempts);
            if attempt < self.attempts {
                thread::sleep(self.interval);
            }
        }

        Err(Error::Unreachable(format!(
            "postgres at {}:{} after {} attempts",
            self.host, self.port, self.attempts
        )))
    }

    fn try_connect(&self) -> bool {
        let addrs = match (self.host.as_str(), self.port).to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(e) => {
                debug!("Cannot resolve {}: {}", self.host, e);
                return false;
            }
        };

        addrs
            .into_iter()
            .any(|addr| TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT).is_ok())
    }
}
