//! Side-effecting consumers of normalized images: the CSV metadata log,
//! searchable tags, and moving files to their canonical names.

mod metadata_log;
mod relocate;
mod tags;

#[cfg(test)]
mod tests;

pub use metadata_log::MetadataLog;
pub use relocate::{relocate, rename_in_place, MoveOutcome};
pub use tags::{TagWriter, XmpSidecarWriter};

use crate::batch::NormalizedImage;
use anyhow::Result;
use std::path::PathBuf;

/// Where a scanned image should end up
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Placement {
    /// Leave the file where it is
    #[default]
    Leave,
    RenameInPlace,
    /// Move under this root at the canonical path
    Relocate(PathBuf),
}

/// Place `image`, then log and tag it at wherever it ended up
///
/// A failed move leaves the metadata log and tags untouched.
pub fn deliver(
    image: &NormalizedImage,
    placement: &Placement,
    log: Option<&mut MetadataLog>,
    tagger: Option<&dyn TagWriter>,
) -> Result<PathBuf> {
    let location = match placement {
        Placement::Leave => PathBuf::from(image.record.source_path()),
        Placement::RenameInPlace => rename_in_place(image)?.path().to_path_buf(),
        Placement::Relocate(dest) => relocate(image, dest)?.path().to_path_buf(),
    };

    if let Some(log) = log {
        log.append(image)?;
    }
    if let Some(tagger) = tagger {
        tagger.write_tags(&location, &image.record.tag_labels())?;
    }
    Ok(location)
}
