// src/probe/readiness.rs

//! API readiness probe
//!
//! The status endpoint reports online workers, online content apps and the
//! database and redis connections. Each unmet condition has its own exit
//! code so orchestrator logs show what was missing.

use crate::error::{Error, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::fmt;
use tracing::debug;

/// Where the API listens inside the container
pub const DEFAULT_STATUS_BASE_URL: &str = "http://localhost:24817";

/// Status endpoint response, reduced to the fields the probe reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub online_workers: Option<Vec<serde_json::Value>>,

    #[serde(default)]
    pub online_content_apps: Option<Vec<serde_json::Value>>,

    #[serde(default)]
    pub database_connection: Option<ConnectionStatus>,

    #[serde(default)]
    pub redis_connection: Option<ConnectionStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectionStatus {
    #[serde(default)]
    pub connected: bool,
}

/// Probe verdict, checked in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    NoWorkers,
    NoContentApps,
    DatabaseDisconnected,
    RedisDisconnected,
}

impl Readiness {
    pub fn exit_code(self) -> i32 {
        match self {
            Readiness::Ready => 0,
            Readiness::NoWorkers => 1,
            Readiness::NoContentApps => 2,
            Readiness::DatabaseDisconnected => 3,
            Readiness::RedisDisconnected => 4,
        }
    }

    pub fn is_ready(self) -> bool {
        self == Readiness::Ready
    }
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Readiness::Ready => "ready",
            Readiness::NoWorkers => "no online workers",
            Readiness::NoContentApps => "no online content apps",
            Readiness::DatabaseDisconnected => "database not connected",
            Readiness::RedisDisconnected => "redis not connected",
        };
        f.write_str(text)
    }
}

fn connected(status: &Option<ConnectionStatus>) -> bool {
    status.as_ref().is_some_and(|s| s.connected)
}

impl StatusResponse {
    /// Evaluate readiness; redis is only checked when `redis_expected`
    ///
    /// Missing or null fields count as empty or disconnected.
    pub fn readiness(&self, redis_expected: bool) -> Readiness {
        if self.online_workers.as_ref().is_none_or(Vec::is_empty) {
            return Readiness::NoWorkers;
        }
        if self.online_content_apps.as_ref().is_none_or(Vec::is_empty) {
            return Readiness::NoContentApps;
        }
        if !connected(&self.database_connection) {
            return Readiness::DatabaseDisconnected;
        }
        if redis_expected && !connected(&self.redis_connection) {
            return Readiness::RedisDisconnected;
        }
        Readiness::Ready
    }
}

/// HTTP client for the status endpoint
pub struct ReadinessProbe {
    client: Client,
    base_url: String,
}

impl ReadinessProbe {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("pulp-images/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::FetchFailed(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn status_url(&self, status_path: &str) -> String {
        format!("{}{}", self.base_url, status_path)
    }

    /// GET the status document, following redirects
    ///
    /// The HTTP status code is not checked; a body that does not decode as
    /// a status document is the failure.
    pub fn fetch_status(&self, status_path: &str) -> Result<StatusResponse> {
        let url = self.status_url(status_path);
        debug!("Fetching status from {}", url);

        let body = self
            .client
            .get(&url)
            .send()
            .and_then(|response| response.text())
            .map_err(|e| Error::FetchFailed(format!("Failed to fetch {}: {}", url, e)))?;

        serde_json::from_str(&body)
            .map_err(|e| Error::FetchFailed(format!("Invalid status document from {}: {}", url, e)))
    }

    pub fn check(&self, status_path: &str, redis_expected: bool) -> Result<Readiness> {
        Ok(self.fetch_status(status_path)?.readiness(redis_expected))
    }
}
