// src/release.rs

//! Stable image release planning
//!
//! Decides what the next stable image of a family pins, then records it in
//! the workspace's CI files.
//!
//! - `pulp`: the newest core release with a complete compatible plugin set
//! - `galaxy`: the newest `galaxy_ng` release together with the core range
//!   it declares

use crate::config::{ImagesConfig, OutputSection};
use crate::error::{Error, Result};
use crate::registry::PackageIndex;
use crate::resolver::CompatibilityResolver;
use crate::vars::{DeployScript, ImageDescriptor, VarsFile};
use crate::version::{order_descending, Requirement};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Image family, selecting packages, vars files and repository names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFamily {
    Pulp,
    Galaxy,
}

impl ImageFamily {
    /// Family for a `CI_TEST` value: `galaxy` selects galaxy, anything else pulp
    pub fn from_ci_test(value: Option<&str>) -> Self {
        match value {
            Some("galaxy") => ImageFamily::Galaxy,
            _ => ImageFamily::Pulp,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFamily::Pulp => "pulp",
            ImageFamily::Galaxy => "galaxy",
        }
    }

    /// Container repository of the core image; also the web image's base
    pub fn repo_name(&self) -> &'static str {
        self.as_str()
    }

    pub fn web_repo_name(&self) -> String {
        format!("{}-web", self.as_str())
    }

    pub fn stable_key(&self) -> String {
        format!("{}_stable", self.as_str())
    }

    pub fn web_stable_key(&self) -> String {
        format!("{}_web_stable", self.as_str())
    }

    pub fn vars_path(&self, workspace: &Path) -> PathBuf {
        workspace
            .join(".ci/ansible")
            .join(self.as_str())
            .join("vars.yaml")
    }

    pub fn web_vars_path(&self, workspace: &Path) -> PathBuf {
        workspace
            .join(".ci/ansible")
            .join(self.as_str())
            .join("web/vars.yaml")
    }
}

impl fmt::Display for ImageFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ImageFamily {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pulp" => Ok(ImageFamily::Pulp),
            "galaxy" => Ok(ImageFamily::Galaxy),
            other => Err(Error::ParseError(format!(
                "Unknown image family '{}' (expected 'pulp' or 'galaxy')",
                other
            ))),
        }
    }
}

/// Everything recorded for one stable image build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePlan {
    pub family: ImageFamily,
    pub tag: String,
    /// Value of the descriptor's `pulpcore` field
    pub pulpcore: String,
    /// `name==version` pins installed into the core image
    pub plugins: Vec<String>,
    pub web_snippets: Vec<String>,
}

impl ReleasePlan {
    /// One-line summary for the operator
    pub fn summary(&self) -> String {
        match self.family {
            ImageFamily::Pulp => format!("{} {}", self.pulpcore, self.plugins.join(" ")),
            ImageFamily::Galaxy => format!(
                "{} {}",
                self.plugins.join(" "),
                self.pulpcore.trim_matches('"')
            ),
        }
    }

    pub fn core_descriptor(&self) -> ImageDescriptor {
        ImageDescriptor::core(
            self.family.repo_name(),
            &self.tag,
            &self.pulpcore,
            self.plugins.clone(),
        )
    }

    pub fn web_descriptor(&self, python_version: &str) -> ImageDescriptor {
        ImageDescriptor::web(
            &self.family.web_repo_name(),
            &self.tag,
            self.family.repo_name(),
            python_version,
            self.web_snippets.clone(),
        )
    }

    /// Append the plan to the family's vars files and the deploy script
    ///
    /// Both vars files are read and updated in memory before either is
    /// written. A failure part way leaves earlier writes in place.
    pub fn persist(&self, workspace: &Path, output: &OutputSection) -> Result<()> {
        let mut core_vars = VarsFile::open(&self.family.vars_path(workspace))?;
        let mut web_vars = VarsFile::open(&self.family.web_vars_path(workspace))?;

        core_vars.append(&self.family.stable_key(), self.core_descriptor());
        web_vars.append(
            &self.family.web_stable_key(),
            self.web_descriptor(&output.python_version),
        );

        core_vars.commit()?;
        web_vars.commit()?;

        let deploy = DeployScript::new(&workspace.join(&output.deploy_script));
        deploy.append_push(self.family.repo_name(), &self.tag, &output.push_script)?;
        deploy.append_push(&self.family.web_repo_name(), &self.tag, &output.push_script)?;

        info!("Recorded {} {} release", self.family, self.tag);
        Ok(())
    }
}

/// Plan the next stable image for `family`
///
/// `Ok(None)` means there is nothing to build this run.
pub fn plan_release<I: PackageIndex>(
    family: ImageFamily,
    index: &I,
    config: &ImagesConfig,
) -> Result<Option<ReleasePlan>> {
    match family {
        ImageFamily::Pulp => plan_pulp_release(index, config),
        ImageFamily::Galaxy => plan_galaxy_release(index, config).map(Some),
    }
}

/// Pin the newest core release every configured plugin supports
pub fn plan_pulp_release<I: PackageIndex>(
    index: &I,
    config: &ImagesConfig,
) -> Result<Option<ReleasePlan>> {
    let core_package = &config.core.package;
    let core = index.fetch(core_package, None)?;
    let core_versions = order_descending(&core.releases);
    debug!(
        "{} has {} releases, newest {}",
        core_package,
        core_versions.len(),
        core.latest_version
    );

    let resolver = CompatibilityResolver::new(index, core_package)
        .with_shim_marker(&config.core.shim_marker);

    let Some(resolution) = resolver.resolve(
        &core_versions,
        &config.pulp.plugins,
        config.core.releases_to_check,
    ) else {
        info!(
            "No compatible plugin set in the newest {} {} release(s)",
            config.core.releases_to_check, core_package
        );
        return Ok(None);
    };

    Ok(Some(ReleasePlan {
        family: ImageFamily::Pulp,
        tag: resolution.core_version.clone(),
        pulpcore: format!("{}=={}", core_package, resolution.core_version),
        plugins: resolution.pins(),
        web_snippets: config.pulp.web_snippets.clone(),
    }))
}

/// Pin the newest galaxy release and the core range it declares
pub fn plan_galaxy_release<I: PackageIndex>(
    index: &I,
    config: &ImagesConfig,
) -> Result<ReleasePlan> {
    let package = &config.galaxy.package;
    let metadata = index.fetch(package, None)?;
    let version = &metadata.latest_version;

    let raw = Requirement::find_raw(metadata.requirements(), &config.core.package).ok_or_else(
        || {
            Error::NotFound(format!(
                "{} requirement in {}=={}",
                config.core.package, package, version
            ))
        },
    )?;
    let requirement = Requirement::parse(raw)?;
    debug!("{}=={} requires {}", package, version, requirement);

    Ok(ReleasePlan {
        family: ImageFamily::Galaxy,
        tag: version.clone(),
        pulpcore: format!("\"{}\"", requirement.specifier()),
        plugins: vec![format!("{}=={}", package, version)],
        web_snippets: config.galaxy.web_snippets.clone(),
    })
}
