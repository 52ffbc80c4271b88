// src/resolver/mod.rs

//! Plugin compatibility resolution against the package index
//!
//! Given the core package's releases (newest first) and a fixed set of
//! candidate plugins, find for each plugin the newest release whose declared
//! core requirement admits the target core version. Only a complete set is
//! ever returned: if any plugin has no compatible release for a core version,
//! that core version is abandoned and the next one is tried.
//!
//! # Flow
//!
//! 1. Fetch every candidate's project metadata once, in parallel. Plugins the
//!    index does not know are dropped from the candidate set.
//! 2. For each core version, scan each plugin's releases newest first,
//!    fetching per-release requirements sequentially as needed.
//! 3. Return on the first core version every plugin supports.

use crate::error::Error;
use crate::registry::{PackageIndex, PackageMetadata};
use crate::version::{order_descending, Requirement, Version};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

/// Requirement marker identifying release lines built on the legacy plugin shim
pub const DEFAULT_SHIM_MARKER: &str = "pulpcore-plugin";

/// A plugin release selected for an image
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedImage {
    pub plugin_name: String,
    pub plugin_version: String,
}

impl fmt::Display for ResolvedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=={}", self.plugin_name, self.plugin_version)
    }
}

/// A complete, compatible plugin set for one core version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub core_version: String,
    pub images: Vec<ResolvedImage>,
}

impl Resolution {
    /// Plugin pins in `name==version` form
    pub fn pins(&self) -> Vec<String> {
        self.images.iter().map(|i| i.to_string()).collect()
    }
}

/// Resolves compatible plugin releases for core package versions
pub struct CompatibilityResolver<I> {
    index: I,
    core_package: String,
    shim_marker: String,
}

impl<I: PackageIndex> CompatibilityResolver<I> {
    /// Create a resolver for plugins of `core_package`
    pub fn new(index: I, core_package: &str) -> Self {
        Self {
            index,
            core_package: core_package.to_string(),
            shim_marker: DEFAULT_SHIM_MARKER.to_string(),
        }
    }

    /// Override the requirement marker that rules a release line out
    pub fn with_shim_marker(mut self, marker: &str) -> Self {
        self.shim_marker = marker.to_string();
        self
    }

    /// Resolve the candidate plugins against the first `releases_to_check`
    /// entries of `core_versions`, in the order given
    ///
    /// Returns `None` when no probed core version has a complete compatible
    /// set, or when a candidate's metadata could not be fetched.
    pub fn resolve<C: AsRef<str>, P: AsRef<str> + Sync>(
        &self,
        core_versions: &[C],
        candidates: &[P],
        releases_to_check: usize,
    ) -> Option<Resolution> {
        let plugins = self.fetch_candidates(candidates)?;
        if plugins.is_empty() {
            warn!("No candidate plugins left to resolve");
            return None;
        }

        for core_version in core_versions.iter().take(releases_to_check.max(1)) {
            let core_version = core_version.as_ref();
            let target = match Version::parse(core_version) {
                Ok(v) => v,
                Err(e) => {
                    warn!("Skipping {} {}: {}", self.core_package, core_version, e);
                    continue;
                }
            };

            info!(
                "Checking {} plugins against {} {}",
                plugins.len(),
                self.core_package,
                core_version
            );

            let mut images = Vec::with_capacity(plugins.len());
            for metadata in plugins.values() {
                match self.compatible_release(metadata, &target) {
                    Some(version) => {
                        debug!(
                            "{}=={} supports {} {}",
                            metadata.name, version, self.core_package, core_version
                        );
                        images.push(ResolvedImage {
                            plugin_name: metadata.name.clone(),
                            plugin_version: version,
                        });
                    }
                    None => {
                        info!(
                            "No release of {} supports {} {}",
                            metadata.name, self.core_package, core_version
                        );
                        break;
                    }
                }
            }

            if images.len() == plugins.len() {
                return Some(Resolution {
                    core_version: core_version.to_string(),
                    images,
                });
            }
        }

        None
    }

    /// Fetch every candidate once, concurrently, keyed by candidate name
    ///
    /// `None` when any fetch failed for a reason other than the package
    /// being absent: that plugin can never resolve, so neither can the run.
    fn fetch_candidates<P: AsRef<str> + Sync>(
        &self,
        candidates: &[P],
    ) -> Option<BTreeMap<String, PackageMetadata>> {
        let results: Vec<(String, crate::Result<PackageMetadata>)> = candidates
            .par_iter()
            .map(|name| {
                let name = name.as_ref();
                (name.to_string(), self.index.fetch(name, None))
            })
            .collect();

        let mut plugins = BTreeMap::new();
        for (name, result) in results {
            match result {
                Ok(metadata) => {
                    plugins.insert(name, metadata);
                }
                Err(Error::NotFound(_)) => {
                    warn!("{} not found on the package index, excluding it", name);
                }
                Err(e) => {
                    warn!("Failed to fetch {}: {}", name, e);
                    return None;
                }
            }
        }
        Some(plugins)
    }

    /// Newest release of a plugin compatible with `target`, if any
    fn compatible_release(&self, metadata: &PackageMetadata, target: &Version) -> Option<String> {
        for release in order_descending(&metadata.releases) {
            let pinned = if release == metadata.latest_version {
                None
            } else {
                match self.index.fetch(&metadata.name, Some(&release)) {
                    Ok(pinned) => Some(pinned),
                    Err(Error::NotFound(_)) => {
                        debug!("{}=={} vanished from the index, skipping", metadata.name, release);
                        continue;
                    }
                    Err(e) => {
                        warn!("Failed to fetch {}=={}: {}", metadata.name, release, e);
                        return None;
                    }
                }
            };
            let requirements = pinned.as_ref().unwrap_or(metadata).requirements();

            if requirements.iter().any(|r| r.contains(&self.shim_marker)) {
                debug!("{}=={} depends on {}", metadata.name, release, self.shim_marker);
                return None;
            }

            if requirements.is_empty() {
                return Some(release);
            }

            let Some(raw) = Requirement::find_raw(requirements, &self.core_package) else {
                return Some(release);
            };

            match Requirement::parse(raw) {
                Ok(requirement) if requirement.range.contains(target) => return Some(release),
                Ok(_) => {}
                Err(e) => {
                    warn!("Unreadable requirement '{}' in {}=={}: {}", raw, metadata.name, release, e);
                    return None;
                }
            }
        }

        None
    }
}
