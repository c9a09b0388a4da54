mod draft;
mod types;


pub(crate) use draft::{check_value, RecordDraft};
pub use types::{Channel, Field, Laterality};

use chrono::NaiveDate;
use serde::Serialize;

/// Normalized metadata for one source image.
///
/// Only a successful convention parse can build one, and nothing mutates it
/// afterwards; a renamed file is re-parsed into a fresh record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetadataRecord {
    pub(crate) sample_id: String,
    pub(crate) specimen: String,
    pub(crate) laterality: Laterality,
    pub(crate) stain_1: String,
    pub(crate) stain_2: Option<String>,
    pub(crate) channel: Channel,
    pub(crate) section: String,
    pub(crate) magnification: String,
    pub(crate) z_stack: Option<String>,
    pub(crate) filetype: String,
    pub(crate) creation_date: NaiveDate,
    pub(crate) source_path: String,
}

impl MetadataRecord {
    pub fn sample_id(&self) -> &str {
        &self.sample_id
    }

    pub fn specimen(&self) -> &str {
        &self.specimen
    }

    pub fn laterality(&self) -> &Laterality {
        &self.laterality
    }

    pub fn stain_1(&self) -> &str {
        &self.stain_1
    }

    pub fn stain_2(&self) -> Option<&str> {
        self.stain_2.as_deref()
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Combined stain label, derived from the stain slots and the channel
    pub fn stain(&self) -> String {
        match (&self.channel, &self.stain_2) {
            (Channel::Overlay, Some(second)) => format!("{}+{}", self.stain_1, second),
            _ => self.stain_1.clone(),
        }
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn magnification(&self) -> &str {
        &self.magnification
    }

    pub fn z_stack(&self) -> Option<&str> {
        self.z_stack.as_deref()
    }

    /// Extension including the leading dot
    pub fn filetype(&self) -> &str {
        &self.filetype
    }

    pub fn creation_date(&self) -> NaiveDate {
        self.creation_date
    }

    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    /// Equality on everything except where the record was read from
    pub fn same_metadata(&self, other: &MetadataRecord) -> bool {
        MetadataRecord {
            source_path: String::new(),
            ..self.clone()
        } == MetadataRecord {
            source_path: String::new(),
            ..other.clone()
        }
    }

    /// Searchable labels for tag writers, in fixed order, empty slots skipped
    pub fn tag_labels(&self) -> Vec<String> {
        [
            Some(self.sample_id.clone()),
            Some(self.specimen.clone()),
            Some(self.laterality.to_string()),
            Some(self.stain_1.clone()),
            self.stain_2.clone(),
            Some(self.channel.to_string()),
            Some(self.section.clone()),
            Some(self.magnification.clone()),
        ]
        .into_iter()
        .flatten()
        .filter(|label| !label.is_empty())
        .collect()
    }

    /// Flat row for tabular and JSON sinks
    pub fn to_row(&self, canonical_path: &str) -> MetadataRow {
        MetadataRow {
            creation_date: self.creation_date,
            filetype: self.filetype.clone(),
            sample_id: self.sample_id.clone(),
            specimen: self.specimen.clone(),
            laterality: self.laterality.to_string(),
            stain_1: self.stain_1.clone(),
            stain_2: self.stain_2.clone(),
            channel: self.channel.to_string(),
            stain: self.stain(),
            section: self.section.clone(),
            magnification: self.magnification.clone(),
            z_stack: self.z_stack.clone(),
            canonical_path: canonical_path.to_string(),
            source_path: self.source_path.clone(),
        }
    }
}

/// Serializable snapshot of a record plus its canonical path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataRow {
    pub creation_date: NaiveDate,
    pub filetype: String,
    pub sample_id: String,
    pub specimen: String,
    pub laterality: String,
    pub stain_1: String,
    pub stain_2: Option<String>,
    pub channel: String,
    pub stain: String,
    pub section: String,
    pub magnification: String,
    pub z_stack: Option<String>,
    pub canonical_path: String,
    pub source_path: String,
}
