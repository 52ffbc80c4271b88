// src/lib.rs

//! Container image release tooling for Pulp CI
//!
//! Finds the newest core release for which every plugin in a fixed set has
//! a compatible published release, and records the resulting image in the
//! CI vars files and deploy script. Also carries the container health probes
//! run inside the built images.
//!
//! # Architecture
//!
//! - `registry`: package index access behind the `PackageIndex` trait
//! - `version`: PEP 440 versions, ranges and requirement strings
//! - `resolver`: compatible plugin set search across core releases
//! - `release`: per-family planning and persistence
//! - `vars`: vars file transactions and deploy script appends
//! - `probe`: readiness and postgres wait probes

pub mod config;
mod error;
pub mod probe;
pub mod registry;
pub mod release;
pub mod resolver;
pub mod vars;
pub mod version;

pub use config::ImagesConfig;
pub use error::{Error, Result};
pub use registry::{IndexClient, PackageIndex, PackageMetadata};
pub use release::{plan_release, ImageFamily, ReleasePlan};
pub use resolver::{CompatibilityResolver, Resolution, ResolvedImage};
pub use version::{Requirement, Version, VersionRange};
