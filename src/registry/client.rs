// src/registry/client.rs

//! HTTP client for the package index JSON API
//!
//! One GET per call, no retries. Callers that need resilience wrap it.

use super::metadata::PackageMetadata;
use super::PackageIndex;
use crate::error::{Error, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::debug;

/// Default index API root
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org/pypi";

/// HTTP client for the PyPI JSON API
pub struct IndexClient {
    client: Client,
    base_url: String,
}

impl IndexClient {
    /// Create a client against the given API root (e.g. `https://pypi.org/pypi`)
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

    /// Project document URL, optionally pinned to a release
    pub fn project_url(&self, name: &str, version: Option<&str>) -> String {
        match version {
            Some(version) => format!("{}/{}/{}/json", self.base_url, name, version),
            None => format!("{}/{}/json", self.base_url, name),
        }
    }
}

impl PackageIndex for IndexClient {
    fn fetch(&self, name: &str, version: Option<&str>) -> Result<PackageMetadata> {
        let url = self.project_url(name, version);
        debug!("Fetching package metadata from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| Error::FetchFailed(format!("Failed to fetch {}: {}", url, e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(match version {
                Some(version) => format!("{}=={} on the package index", name, version),
                None => format!("{} on the package index", name),
            }));
        }
        if !status.is_success() {
            return Err(Error::FetchFailed(format!("HTTP {} from {}", status, url)));
        }

        let body = response
            .text()
            .map_err(|e| Error::FetchFailed(format!("Failed to read response from {}: {}", url, e)))?;

        PackageMetadata::from_json(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Answer one request with `status` and `body`, returning the base URL
    fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{}/pypi", addr)
    }

    #[test]
    fn test_fetch_success() {
        let base = serve_once(
            "200 OK",
            r#"{"info": {"name": "pulp-deb", "version": "2.20.0", "requires_dist": null}, "releases": {"2.20.0": []}}"#,
        );
        let metadata = IndexClient::new(&base).unwrap().fetch("pulp-deb", None).unwrap();
        assert_eq!(metadata.latest_version, "2.20.0");
    }

    #[test]
    fn test_fetch_not_found() {
        let base = serve_once("404 Not Found", r#"{"message": "Not Found"}"#);
        let err = IndexClient::new(&base)
            .unwrap()
            .fetch("pulp-nothing", Some("1.0"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_fetch_server_error() {
        let base = serve_once("503 Service Unavailable", "");
        let err = IndexClient::new(&base).unwrap().fetch("pulp-deb", None).unwrap_err();
        assert!(matches!(err, Error::FetchFailed(_)));
    }

    #[test]
    fn test_project_url() {
        let client = IndexClient::new("https://pypi.org/pypi/").unwrap();
        assert_eq!(
            client.project_url("pulp-rpm", None),
            "https://pypi.org/pypi/pulp-rpm/json"
        );
        assert_eq!(
            client.project_url("pulp-rpm", Some("3.19.0")),
            "https://pypi.org/pypi/pulp-rpm/3.19.0/json"
        );
    }
}
