use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate};
use std::fs::Metadata;
use std::path::{Path, MAIN_SEPARATOR};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

/// Extension scanned for when none is configured
pub const DEFAULT_EXTENSION: &str = "tif";

/// A file found on disk, ready to normalize
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Forward-slash form of the on-disk path
    pub path: String,
    /// Local date of the file's last modification
    pub modified: NaiveDate,
}

impl SourceImage {
    /// Stat a single file
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Failed to read metadata for {}", path.display()))?;
        Ok(Self {
            path: slash_path(path),
            modified: modified_date(&metadata, path),
        })
    }
}

/// Recursive directory walk yielding files with one extension
#[derive(Debug, Clone)]
pub struct ImageWalker {
    extension: String,
}

impl ImageWalker {
    /// `extension` is matched case-insensitively, with or without its dot
    pub fn new(extension: &str) -> Self {
        Self {
            extension: extension.trim_start_matches('.').to_ascii_lowercase(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Lazily walk `root` in file-name order. Unreadable entries are logged
    /// and skipped.
    pub fn walk(&self, root: &Path) -> Result<impl Iterator<Item = SourceImage>> {
        if !root.is_dir() {
            anyhow::bail!("Scan root is not a directory: {}", root.display());
        }

        let extension = self.extension.clone();
        let entries = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                    None
                }
            })
            .filter(move |entry| matches_extension(entry, &extension))
            .filter_map(|entry| {
                let metadata = match entry.metadata() {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        warn!(path = %entry.path().display(), "Failed to stat: {}", e);
                        return None;
                    }
                };
                Some(SourceImage {
                    path: slash_path(entry.path()),
                    modified: modified_date(&metadata, entry.path()),
                })
            });
        Ok(entries)
    }

    /// Walk eagerly, for callers that fan out across threads
    pub fn collect(&self, root: &Path) -> Result<Vec<SourceImage>> {
        Ok(self.walk(root)?.collect())
    }
}

impl Default for ImageWalker {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSION)
    }
}

fn matches_extension(entry: &DirEntry, extension: &str) -> bool {
    entry.file_type().is_file()
        && entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(extension))
            .unwrap_or(false)
}

fn slash_path(path: &Path) -> String {
    let display = path.to_string_lossy();
    if MAIN_SEPARATOR == '/' {
        display.into_owned()
    } else {
        display.replace(MAIN_SEPARATOR, "/")
    }
}

/// Modification time as a local calendar date; today when the platform
/// cannot report one
fn modified_date(metadata: &Metadata, path: &Path) -> NaiveDate {
    match metadata.modified() {
        Ok(time) => DateTime::<Local>::from(time).date_naive(),
        Err(e) => {
            warn!(path = %path.display(), "No modification time, using today: {}", e);
            Local::now().date_naive()
        }
    }
}
