use crate::batch::NormalizedImage;
use anyhow::{bail, Context, Result};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Append-only CSV log with one row per normalized image
pub struct MetadataLog {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows: usize,
}

impl MetadataLog {
    /// Open `path` for appending, creating it if needed. The header row is
    /// only written when the file is new or empty.
    pub fn open(path: &Path) -> Result<Self> {
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if !is_csv {
            bail!("Metadata log must be a .csv file: {}", path.display());
        }

        let needs_header = match std::fs::metadata(path) {
            Ok(metadata) => metadata.len() == 0,
            Err(_) => true,
        };
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .context(format!("Failed to open metadata log: {}", path.display()))?;
        let writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            rows: 0,
        })
    }

    pub fn append(&mut self, image: &NormalizedImage) -> Result<()> {
        let row = image.record.to_row(image.canonical.as_str());
        self.writer
            .serialize(&row)
            .context(format!("Failed to write row to {}", self.path.display()))?;
        self.rows += 1;
        Ok(())
    }

    /// Rows appended through this handle
    pub fn rows_written(&self) -> usize {
        self.rows
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .context(format!("Failed to flush {}", self.path.display()))?;
        Ok(())
    }
}
