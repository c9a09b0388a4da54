use crate::batch::NormalizedImage;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What happened to a file asked to take its canonical name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved { from: PathBuf, to: PathBuf },
    /// Source already sits at the target; nothing touched
    AlreadyCanonical(PathBuf),
}

impl MoveOutcome {
    /// Where the file lives now
    pub fn path(&self) -> &Path {
        match self {
            MoveOutcome::Moved { to, .. } => to,
            MoveOutcome::AlreadyCanonical(path) => path,
        }
    }
}

/// Change only the base name to the canonical file name, keeping the
/// directory. Records are not edited: re-parse the new path for a fresh one.
pub fn rename_in_place(image: &NormalizedImage) -> Result<MoveOutcome> {
    let source = Path::new(image.record.source_path());
    let target = source.with_file_name(image.canonical.file_name());
    move_file(source, target)
}

/// Move to `<dest_root>/<canonical path>`, creating parent directories
pub fn relocate(image: &NormalizedImage, dest_root: &Path) -> Result<MoveOutcome> {
    let source = Path::new(image.record.source_path());
    let target = image.canonical.under(dest_root);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .context(format!("Failed to create directory: {}", parent.display()))?;
    }
    move_file(source, target)
}

fn move_file(source: &Path, target: PathBuf) -> Result<MoveOutcome> {
    if source == target.as_path() {
        info!(path = %source.display(), "Already canonical, leaving in place");
        return Ok(MoveOutcome::AlreadyCanonical(target));
    }
    if target.exists() {
        bail!(
            "Refusing to overwrite {} with {}",
            target.display(),
            source.display()
        );
    }

    if let Err(e) = fs::rename(source, &target) {
        // Renames cannot cross filesystems
        debug!("rename failed ({}), copying instead", e);
        fs::copy(source, &target).context(format!(
            "Failed to move {} to {}",
            source.display(),
            target.display()
        ))?;
        fs::remove_file(source)
            .context(format!("Failed to remove {} after copy", source.display()))?;
    }

    info!(from = %source.display(), to = %target.display(), "Moved");
    Ok(MoveOutcome::Moved {
        from: source.to_path_buf(),
        to: target,
    })
}
