// src/registry/metadata.rs

//! Package index metadata data structures
//!
//! Contains the typed shape of the index's JSON project documents and the
//! `PackageMetadata` value the rest of the crate works with.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Project document returned by `/pypi/{name}/json` and
/// `/pypi/{name}/{version}/json`
#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectResponse {
    pub info: ProjectInfo,
    /// Release files keyed by version; only the keys are used
    #[serde(default)]
    pub releases: BTreeMap<String, serde_json::Value>,
}

/// The `info` block of a project document
#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    pub version: String,
    pub requires_dist: Option<Vec<String>>,
}

/// Package metadata fetched from the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    pub name: String,
    /// Version the index reported: the newest release for an unpinned
    /// fetch, the pinned release otherwise
    pub latest_version: String,
    /// Every published release
    pub releases: BTreeSet<String>,
    /// Requirement strings declared by `latest_version`
    pub requires_dist: Option<Vec<String>>,
}

impl PackageMetadata {
    /// Decode a project document
    ///
    /// A body that does not match the expected shape is a fetch failure.
    pub fn from_json(body: &str) -> Result<Self> {
        let response: ProjectResponse = serde_json::from_str(body)
            .map_err(|e| Error::FetchFailed(format!("Failed to parse project JSON: {e}")))?;
        Ok(response.into())
    }

    /// Requirements of `latest_version`, empty when none are declared
    pub fn requirements(&self) -> &[String] {
        self.requires_dist.as_deref().unwrap_or(&[])
    }
}

impl From<ProjectResponse> for PackageMetadata {
    fn from(response: ProjectResponse) -> Self {
        Self {
            name: response.info.name,
            latest_version: response.info.version,
            releases: response.releases.into_keys().collect(),
            requires_dist: response.info.requires_dist,
        }
    }
}
