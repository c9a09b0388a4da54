//! Upload of normalized images into a nested collection hierarchy that
//! mirrors the canonical path's directories.

mod sqlite;


pub use sqlite::{SqliteWarehouse, StoredFile, WarehouseStats};

use crate::batch::NormalizedImage;
use anyhow::{bail, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Opaque identifier the warehouse hands out for a collection
pub type CollectionId = String;

/// Storage operations the uploader needs from a data warehouse
pub trait Warehouse {
    /// Child collection of `parent` (or a top-level one) named `name`
    fn find_collection(&self, parent: Option<&str>, name: &str) -> Result<Option<CollectionId>>;

    fn create_collection(&self, parent: Option<&str>, name: &str) -> Result<CollectionId>;

    /// Whether `collection` already holds a file named `name`
    fn has_file(&self, collection: &str, name: &str) -> Result<bool>;

    /// Store the bytes at `source` in `collection` under `name`
    fn upload_file(
        &self,
        collection: &str,
        name: &str,
        source: &Path,
        profile: Option<&str>,
    ) -> Result<()>;
}

impl<W: Warehouse + ?Sized> Warehouse for &W {
    fn find_collection(&self, parent: Option<&str>, name: &str) -> Result<Option<CollectionId>> {
        (**self).find_collection(parent, name)
    }

    fn create_collection(&self, parent: Option<&str>, name: &str) -> Result<CollectionId> {
        (**self).create_collection(parent, name)
    }

    fn has_file(&self, collection: &str, name: &str) -> Result<bool> {
        (**self).has_file(collection, name)
    }

    fn upload_file(
        &self,
        collection: &str,
        name: &str,
        source: &Path,
        profile: Option<&str>,
    ) -> Result<()> {
        (**self).upload_file(collection, name, source, profile)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UploadOutcome {
    Uploaded { collection: CollectionId, name: String },
    /// A same-named file was already in the target collection
    AlreadyPresent { collection: CollectionId, name: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    pub uploaded: usize,
    pub already_present: usize,
    pub failed: usize,
    pub collections_created: usize,
}

/// Uploads images under one dataset, creating each collection level the
/// first time it is needed.
///
/// Resolved directories are cached, so a level is looked up at most once per
/// run and never created twice.
pub struct Uploader<W: Warehouse> {
    warehouse: W,
    dataset: String,
    profile: Option<String>,
    resolved: HashMap<String, CollectionId>,
    summary: UploadSummary,
}

impl<W: Warehouse> Uploader<W> {
    pub fn new(warehouse: W, dataset: impl Into<String>, profile: Option<String>) -> Self {
        Self {
            warehouse,
            dataset: dataset.into(),
            profile,
            resolved: HashMap::new(),
            summary: UploadSummary::default(),
        }
    }

    pub fn warehouse(&self) -> &W {
        &self.warehouse
    }

    pub fn summary(&self) -> &UploadSummary {
        &self.summary
    }

    /// Upload one image unless its canonical file name is already present
    ///
    /// Any error, including a failed collection lookup, counts as a failure.
    pub fn upload(&mut self, image: &NormalizedImage) -> Result<UploadOutcome> {
        let outcome = self.try_upload(image);
        if outcome.is_err() {
            self.summary.failed += 1;
        }
        outcome
    }

    fn try_upload(&mut self, image: &NormalizedImage) -> Result<UploadOutcome> {
        let collection = self.resolve_directory(image.canonical.directory())?;
        let name = image.canonical.file_name().to_string();

        if self.warehouse.has_file(&collection, &name)? {
            info!(file = %name, "Already uploaded, skipping");
            self.summary.already_present += 1;
            return Ok(UploadOutcome::AlreadyPresent { collection, name });
        }

        let source = Path::new(image.record.source_path());
        self.warehouse
            .upload_file(&collection, &name, source, self.profile.as_deref())?;
        info!(file = %name, dataset = %self.dataset, "Uploaded");
        self.summary.uploaded += 1;
        Ok(UploadOutcome::Uploaded { collection, name })
    }

    /// Find-or-create the dataset collection and every level of `directory`
    /// beneath it, returning the deepest
    fn resolve_directory(&mut self, directory: &str) -> Result<CollectionId> {
        if let Some(id) = self.resolved.get(directory) {
            return Ok(id.clone());
        }

        let dataset = self.dataset.clone();
        let mut current = self.resolve_level("", None, &dataset)?;
        let mut walked = String::new();
        for level in directory.split('/').filter(|s| !s.is_empty()) {
            if !walked.is_empty() {
                walked.push('/');
            }
            walked.push_str(level);
            current = self.resolve_level(&walked, Some(current.as_str()), level)?;
        }
        Ok(current)
    }

    /// Cached find-or-create keyed by the directory walked so far
    fn resolve_level(
        &mut self,
        key: &str,
        parent: Option<&str>,
        name: &str,
    ) -> Result<CollectionId> {
        if let Some(id) = self.resolved.get(key) {
            return Ok(id.clone());
        }
        let id = self.find_or_create(parent, name)?;
        self.resolved.insert(key.to_string(), id.clone());
        Ok(id)
    }

    fn find_or_create(&mut self, parent: Option<&str>, name: &str) -> Result<CollectionId> {
        if let Some(id) = self.warehouse.find_collection(parent, name)? {
            return Ok(id);
        }
        info!(collection = %name, "Creating collection");
        self.summary.collections_created += 1;
        self.warehouse.create_collection(parent, name)
    }
}

/// Source paths of `images` that no longer exist on disk
pub fn missing_sources(images: &[NormalizedImage]) -> Vec<&str> {
    images
        .iter()
        .map(|image| image.record.source_path())
        .filter(|path| !Path::new(path).exists())
        .collect()
}

/// Check every source exists before anything is uploaded. Missing files are
/// logged; the run fails unless `allow_missing` is set.
pub fn preflight(images: &[NormalizedImage], allow_missing: bool) -> Result<()> {
    let missing = missing_sources(images);
    if missing.is_empty() {
        info!("All {} files in place", images.len());
        return Ok(());
    }
    for path in &missing {
        warn!(path = %path, "Source file does not exist");
    }
    if !allow_missing {
        bail!(
            "{} of {} source files are missing",
            missing.len(),
            images.len()
        );
    }
    Ok(())
}
