// src/vars/mod.rs

//! CI deployment variable files
//!
//! Image builds are driven by YAML vars documents holding an ordered
//! `images` list, each entry a single-key map from an image key
//! (`pulp_stable`) to its descriptor. New builds are recorded by appending
//! to that list and by appending push lines to a deploy shell script.
//!
//! # Transactions
//!
//! `VarsFile::open` reads the whole document, callers append entries, and
//! `VarsFile::commit` rewrites the file through a temporary file renamed
//! into place. Readers never see a half-written document. There is no
//! locking: one writer per workspace at a time is assumed, and concurrent
//! runs may lose each other's entries.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// One image entry's descriptor
///
/// Core images carry `pulpcore` and `plugins`; web images carry
/// `base_image_name`, `python_version` and `plugin_snippets`. Keys this
/// type does not know are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub image_name: String,
    pub tag: String,
    pub container_file: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pulpcore: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_image_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_snippets: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: serde_yaml::Mapping,
}

impl ImageDescriptor {
    /// Descriptor for an image built from the core container file
    pub fn core(image_name: &str, tag: &str, pulpcore: &str, plugins: Vec<String>) -> Self {
        Self {
            image_name: image_name.to_string(),
            tag: tag.to_string(),
            container_file: "Containerfile.core".to_string(),
            pulpcore: Some(pulpcore.to_string()),
            plugins: Some(plugins),
            base_image_name: None,
            python_version: None,
            plugin_snippets: None,
            extra: serde_yaml::Mapping::new(),
        }
    }

    /// Descriptor for a web image layered on `base_image_name`
    pub fn web(
        image_name: &str,
        tag: &str,
        base_image_name: &str,
        python_version: &str,
        plugin_snippets: Vec<String>,
    ) -> Self {
        Self {
            image_name: image_name.to_string(),
            tag: tag.to_string(),
            container_file: "Containerfile.web".to_string(),
            pulpcore: None,
            plugins: None,
            base_image_name: Some(base_image_name.to_string()),
            python_version: Some(python_version.to_string()),
            plugin_snippets: Some(plugin_snippets),
            extra: serde_yaml::Mapping::new(),
        }
    }
}

/// A vars document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VarsDocument {
    #[serde(default)]
    pub images: Vec<BTreeMap<String, ImageDescriptor>>,

    /// Other top-level variables, preserved as read
    #[serde(flatten)]
    pub extra: serde_yaml::Mapping,
}

/// An open read-modify-write transaction on one vars file
#[derive(Debug)]
pub struct VarsFile {
    path: PathBuf,
    document: VarsDocument,
}

impl VarsFile {
    /// Read and parse a vars file
    ///
    /// An empty file reads as an empty document; a missing file is an error.
    pub fn open(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::PersistenceFailed(format!("Failed to read {}: {e}", path.display()))
        })?;

        let document = if content.trim().is_empty() {
            VarsDocument::default()
        } else {
            serde_yaml::from_str(&content).map_err(|e| {
                Error::PersistenceFailed(format!("Failed to parse {}: {e}", path.display()))
            })?
        };

        debug!("Loaded {} image entries from {}", document.images.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &VarsDocument {
        &self.document
    }

    /// Append `{key: descriptor}` to the images list
    pub fn append(&mut self, key: &str, descriptor: ImageDescriptor) {
        let mut entry = BTreeMap::new();
        entry.insert(key.to_string(), descriptor);
        self.document.images.push(entry);
    }

    /// Write the document back, replacing the file atomically
    ///
    /// Permissions of the replaced file are kept.
    pub fn commit(self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let persist_err = |e: &dyn std::fmt::Display| {
            Error::PersistenceFailed(format!("Failed to write {}: {}", self.path.display(), e))
        };

        let mut temp = NamedTempFile::new_in(dir).map_err(|e| persist_err(&e))?;
        serde_yaml::to_writer(&mut temp, &self.document).map_err(|e| persist_err(&e))?;
        temp.as_file().sync_all().map_err(|e| persist_err(&e))?;

        if let Ok(metadata) = fs::metadata(&self.path) {
            fs::set_permissions(temp.path(), metadata.permissions()).map_err(|e| persist_err(&e))?;
        }

        temp.persist(&self.path).map_err(|e| persist_err(&e.error))?;

        info!("Wrote {} image entries to {}", self.document.images.len(), self.path.display());
        Ok(())
    }
}

/// Append-only deploy trigger script
#[derive(Debug, Clone)]
pub struct DeployScript {
    path: PathBuf,
}

impl DeployScript {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Shell line pushing `repo_name:tag` through the push utility
    pub fn push_line(repo_name: &str, tag: &str, push_script: &str) -> String {
        format!(
            "sudo -E QUAY_REPO_NAME={} QUAY_IMAGE_TAG=\"{}\" {}",
            repo_name, tag, push_script
        )
    }

    /// Append a push line, creating the script if needed
    pub fn append_push(&self, repo_name: &str, tag: &str, push_script: &str) -> Result<()> {
        let line = Self::push_line(repo_name, tag, push_script);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                Error::PersistenceFailed(format!("Failed to open {}: {e}", self.path.display()))
            })?;

        writeln!(file, "{}", line).map_err(|e| {
            Error::PersistenceFailed(format!("Failed to append to {}: {e}", self.path.display()))
        })?;

        debug!("Appended to {}: {}", self.path.display(), line);
        Ok(())
    }
}
