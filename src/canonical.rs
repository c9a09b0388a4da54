//! SPARC-BIDS canonical paths.
//!
//! ```text
//! samples/sample-{id}/specimen-{s}/laterality-{l}/stain-{st}/section-{se}/magnification-{m}/
//! sam-{id}_spec-{s}_lat-{l}_stain-{st}_sec-{se}_mag-{m}[_z-{z}]{ext}
//! ```
//!
//! The filename is itself SPARC-tagged, so re-parsing a canonical path and
//! rebuilding it gives the same path back.

use crate::record::MetadataRecord;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Top-level directory all canonical paths live under
pub const SAMPLES_ROOT: &str = "samples";

/// Relative, `/`-separated canonical path for one record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CanonicalPath(String);

impl CanonicalPath {
    /// Build the canonical path for a record. Total and deterministic.
    pub fn build(record: &MetadataRecord) -> Self {
        let stain = record.stain();
        let laterality = record.laterality().as_str();

        let mut path = format!(
            "{root}/sample-{id}/specimen-{spec}/laterality-{lat}/stain-{stain}/section-{sec}/magnification-{mag}/\
             sam-{id}_spec-{spec}_lat-{lat}_stain-{stain}_sec-{sec}_mag-{mag}",
            root = SAMPLES_ROOT,
            id = record.sample_id(),
            spec = record.specimen(),
            lat = laterality,
            stain = stain,
            sec = record.section(),
            mag = record.magnification(),
        );
        if let Some(z) = record.z_stack() {
            path.push_str("_z-");
            path.push_str(z);
        }
        path.push_str(record.filetype());
        CanonicalPath(path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory part, without trailing slash
    pub fn directory(&self) -> &str {
        self.0.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
    }

    pub fn file_name(&self) -> &str {
        self.0.rsplit_once('/').map(|(_, name)| name).unwrap_or(&self.0)
    }

    /// Directory segments in order, one per warehouse collection level
    pub fn collection_levels(&self) -> impl Iterator<Item = &str> {
        self.directory().split('/').filter(|s| !s.is_empty())
    }

    /// Resolve under a destination root on the local filesystem
    pub fn under(&self, root: &Path) -> PathBuf {
        self.0.split('/').fold(root.to_path_buf(), |acc, part| acc.join(part))
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Free-function form of [`CanonicalPath::build`]
pub fn build(record: &MetadataRecord) -> CanonicalPath {
    CanonicalPath::build(record)
}
