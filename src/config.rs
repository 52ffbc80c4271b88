// src/config.rs

//! Configuration file parsing for image tooling
//!
//! Every setting has a built-in default matching the upstream CI layout, so
//! the file is optional. Supports TOML files with the following sections:
//! - [index] - Package index API root
//! - [core] - Core package name, shim marker, core releases to probe
//! - [pulp] - Candidate plugins and web snippets for the pulp images
//! - [galaxy] - Package and web snippets for the galaxy images
//! - [output] - Deploy script, push script, web image python version

use crate::error::{Error, Result};
use crate::registry::DEFAULT_INDEX_URL;
use crate::resolver::DEFAULT_SHIM_MARKER;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// TOML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImagesConfig {
    #[serde(default)]
    pub index: IndexSection,

    #[serde(default)]
    pub core: CoreSection,

    #[serde(default)]
    pub pulp: PulpSection,

    #[serde(default)]
    pub galaxy: GalaxySection,

    #[serde(default)]
    pub output: OutputSection,
}

/// Package index settings
#[derive(Debug, Clone, Deserialize)]
pub struct IndexSection {
    /// JSON API root, e.g. `https://pypi.org/pypi`
    #[serde(default = "default_index_url")]
    pub url: String,
}

impl Default for IndexSection {
    fn default() -> Self {
        Self {
            url: default_index_url(),
        }
    }
}

fn default_index_url() -> String {
    DEFAULT_INDEX_URL.to_string()
}

/// Core package settings
#[derive(Debug, Clone, Deserialize)]
pub struct CoreSection {
    /// Package plugins declare compatibility against
    #[serde(default = "default_core_package")]
    pub package: String,

    /// Requirement text marking a plugin release line as unusable
    #[serde(default = "default_shim_marker")]
    pub shim_marker: String,

    /// How many of the newest core releases to probe
    #[serde(default = "default_releases_to_check")]
    pub releases_to_check: usize,
}

impl Default for CoreSection {
    fn default() -> Self {
        Self {
            package: default_core_package(),
            shim_marker: default_shim_marker(),
            releases_to_check: default_releases_to_check(),
        }
    }
}

fn default_core_package() -> String {
    "pulpcore".to_string()
}

fn default_shim_marker() -> String {
    DEFAULT_SHIM_MARKER.to_string()
}

fn default_releases_to_check() -> usize {
    1
}

/// Pulp image family settings
#[derive(Debug, Clone, Deserialize)]
pub struct PulpSection {
    /// Plugins that must all resolve for an image to be built
    #[serde(default = "default_pulp_plugins")]
    pub plugins: Vec<String>,

    /// Plugins whose webserver snippets go into the web image
    #[serde(default = "default_pulp_web_snippets")]
    pub web_snippets: Vec<String>,
}

impl Default for PulpSection {
    fn default() -> Self {
        Self {
            plugins: default_pulp_plugins(),
            web_snippets: default_pulp_web_snippets(),
        }
    }
}

fn default_pulp_plugins() -> Vec<String> {
    [
        "pulp-ansible",
        "pulp-certguard",
        "pulp-container",
        "pulp-deb",
        "pulp-file",
        "pulp-python",
        "pulp-rpm",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_pulp_web_snippets() -> Vec<String> {
    ["pulp_ansible", "pulp_container", "pulp_python"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Galaxy image family settings
#[derive(Debug, Clone, Deserialize)]
pub struct GalaxySection {
    /// Package pinned into the galaxy image
    #[serde(default = "default_galaxy_package")]
    pub package: String,

    #[serde(default = "default_galaxy_web_snippets")]
    pub web_snippets: Vec<String>,
}

impl Default for GalaxySection {
    fn default() -> Self {
        Self {
            package: default_galaxy_package(),
            web_snippets: default_galaxy_web_snippets(),
        }
    }
}

fn default_galaxy_package() -> String {
    "galaxy_ng".to_string()
}

fn default_galaxy_web_snippets() -> Vec<String> {
    ["galaxy_ng", "pulp_ansible", "pulp_container"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Output file settings
#[derive(Debug, Clone, Deserialize)]
pub struct OutputSection {
    /// Deploy trigger script, relative to the workspace
    #[serde(default = "default_deploy_script")]
    pub deploy_script: PathBuf,

    /// Push utility invoked by the deploy lines, written verbatim
    #[serde(default = "default_push_script")]
    pub push_script: String,

    /// Python version recorded for web images
    #[serde(default = "default_python_version")]
    pub python_version: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            deploy_script: default_deploy_script(),
            push_script: default_push_script(),
            python_version: default_python_version(),
        }
    }
}

fn default_deploy_script() -> PathBuf {
    PathBuf::from(".ci/scripts/deploy.sh")
}

fn default_push_script() -> String {
    "$GITHUB_WORKSPACE/.ci/scripts/quay-push.sh".to_string()
}

fn default_python_version() -> String {
    "3.9".to_string()
}

impl ImagesConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        let config: ImagesConfig = toml::from_str(&content).map_err(|e| {
            Error::ConfigError(format!("Failed to parse config file {}: {e}", path.display()))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.core.releases_to_check == 0 {
            return Err(Error::ConfigError(
                "core.releases_to_check must be at least 1".to_string(),
            ));
        }
        if self.core.package.trim().is_empty() {
            return Err(Error::ConfigError("core.package must not be empty".to_string()));
        }
        if self.pulp.plugins.is_empty() {
            return Err(Error::ConfigError("pulp.plugins must not be empty".to_string()));
        }
        if self.galaxy.package.trim().is_empty() {
            return Err(Error::ConfigError("galaxy.package must not be empty".to_string()));
        }
        Ok(())
    }
}
