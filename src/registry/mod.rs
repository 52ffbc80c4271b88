// src/registry/mod.rs

//! Package index access
//!
//! This module provides:
//! - The `PackageIndex` trait the resolver queries
//! - An HTTP implementation for the PyPI JSON API
//! - Typed project metadata

mod client;
mod metadata;

pub use client::{IndexClient, DEFAULT_INDEX_URL};
pub use metadata::{PackageMetadata, ProjectInfo, ProjectResponse};

use crate::error::Result;

/// Source of package metadata
///
/// `fetch(name, None)` returns the project with its newest release and
/// release list; `fetch(name, Some(version))` returns that release's
/// metadata. Missing packages or releases yield `Error::NotFound`.
///
/// Implementations must be `Sync`: the resolver fans out initial fetches
/// across threads.
pub trait PackageIndex: Sync {
    fn fetch(&self, name: &str, version: Option<&str>) -> Result<PackageMetadata>;
}

impl<T: PackageIndex + ?Sized> PackageIndex for &T {
    fn fetch(&self, name: &str, version: Option<&str>) -> Result<PackageMetadata> {
        (**self).fetch(name, version)
    }
}
