// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use pulp_images::{Error, PackageIndex, PackageMetadata, Result};
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

/// In-memory package index serving PyPI-shaped JSON documents.
///
/// The first release registered for a project is its newest. Every fetch
/// goes through `PackageMetadata::from_json`, like the HTTP client.
#[derive(Default)]
pub struct FixtureIndex {
    projects: BTreeMap<String, Vec<(String, Vec<String>)>>,
    fetches: Mutex<Vec<String>>,
}

impl FixtureIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a release and the requirements it declares
    pub fn release(mut self, name: &str, version: &str, requires: &[&str]) -> Self {
        self.projects.entry(name.to_string()).or_default().push((
            version.to_string(),
            requires.iter().map(|r| r.to_string()).collect(),
        ));
        self
    }

    /// Every fetch made so far, as `name` or `name==version`
    pub fn fetches(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }

    fn document(&self, name: &str, version: Option<&str>) -> Option<String> {
        let releases = self.projects.get(name)?;
        let (reported, requires) = match version {
            Some(v) => releases.iter().find(|(r, _)| r == v)?,
            None => releases.first()?,
        };

        let requires_dist = if requires.is_empty() {
            serde_json::Value::Null
        } else {
            json!(requires)
        };
        let files: serde_json::Map<String, serde_json::Value> = match version {
            Some(_) => serde_json::Map::new(),
            None => releases.iter().map(|(r, _)| (r.clone(), json!([]))).collect(),
        };

        Some(
            json!({
                "info": {
                    "name": name,
                    "version": reported,
                    "summary": "fixture",
                    "requires_dist": requires_dist,
                },
                "releases": files,
            })
            .to_string(),
        )
    }
}

impl PackageIndex for FixtureIndex {
    fn fetch(&self, name: &str, version: Option<&str>) -> Result<PackageMetadata> {
        self.fetches.lock().unwrap().push(match version {
            Some(v) => format!("{}=={}", name, v),
            None => name.to_string(),
        });

        match self.document(name, version) {
            Some(body) => PackageMetadata::from_json(&body),
            None => Err(Error::NotFound(name.to_string())),
        }
    }
}

const CORE_VARS: &str = r#"---
registry: quay.io
project: pulp
images:
  - FAMILY_nightly:
      image_name: FAMILY
      tag: nightly
      container_file: Containerfile.core.nightly
      pulpcore: git+https://github.com/pulp/pulpcore.git
      plugins:
        - git+https://github.com/pulp/pulp_file.git
"#;

const WEB_VARS: &str = r#"---
registry: quay.io
images:
  - FAMILY_web_nightly:
      image_name: FAMILY-web
      tag: nightly
      container_file: Containerfile.web
      base_image_name: FAMILY
      python_version: "3.9"
      plugin_snippets: []
"#;

/// Create a workspace with the CI layout for `family`.
///
/// Returns the TempDir - keep it alive to prevent cleanup.
pub fn ci_workspace(family: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let ansible = root.join(".ci/ansible").join(family);
    fs::create_dir_all(ansible.join("web")).unwrap();
    fs::create_dir_all(root.join(".ci/scripts")).unwrap();

    fs::write(ansible.join("vars.yaml"), CORE_VARS.replace("FAMILY", family)).unwrap();
    fs::write(ansible.join("web/vars.yaml"), WEB_VARS.replace("FAMILY", family)).unwrap();
    fs::write(root.join(".ci/scripts/deploy.sh"), "#!/bin/bash\nset -euv\n").unwrap();

    dir
}

/// Read a vars file back as loose YAML
pub fn read_yaml(path: &Path) -> serde_yaml::Value {
    serde_yaml::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}
