use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Marker for files an earlier run already trimmed and filtered.
pub const DEFAULT_EXCLUDE: &str = "trimmed_filtered";

/// Whether a matched file is moved or copied to its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferMode {
    #[default]
    Move,
    Copy,
}

/// Names of the immediate entries (files and directories) of `dir`, sorted.
///
/// Names that are not valid UTF-8 cannot be matched against patterns and are
/// skipped with a warning.
pub fn list_entries(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => log::warn!("Skipping non UTF-8 entry {:?} in {}", raw, dir.display()),
        }
    }
    names.sort();
    Ok(names)
}

/// Immediate subdirectories of `dir`, sorted by name.
pub fn list_subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(list_entries(dir)?
        .into_iter()
        .map(|name| dir.join(name))
        .filter(|path| path.is_dir())
        .collect())
}

/// Regular files in `dir` whose name ends with `extension` and does not
/// contain `exclude`. An empty `exclude` excludes nothing.
pub fn list_candidate_files(dir: &Path, extension: &str, exclude: &str) -> Result<Vec<String>> {
    Ok(list_entries(dir)?
        .into_iter()
        .filter(|name| name.ends_with(extension))
        .filter(|name| exclude.is_empty() || !name.contains(exclude))
        .filter(|name| dir.join(name).is_file())
        .collect())
}

/// Create `dir` (and parents) if it does not exist yet.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))
}

/// Whether `a` and `b` resolve to the same existing file.
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Move or copy `src` to `dst`, replacing any existing `dst`. Returns
/// `false` without touching anything when both name the same file.
///
/// A move is a rename; when that fails (e.g. across filesystems) the file is
/// copied and the source removed.
pub fn transfer(src: &Path, dst: &Path, mode: TransferMode) -> Result<bool> {
    if same_file(src, dst) {
        log::info!("{} is already in place, skipping", src.display());
        return Ok(false);
    }

    match mode {
        TransferMode::Copy => {
            copy(src, dst)?;
        }
        TransferMode::Move => {
            if let Err(rename_err) = fs::rename(src, dst) {
                log::debug!(
                    "Rename {} -> {} failed ({}), copying instead",
                    src.display(),
                    dst.display(),
                    rename_err
                );
                copy(src, dst).with_context(|| {
                    format!(
                        "Failed to move {} to {} (rename failed: {})",
                        src.display(),
                        dst.display(),
                        rename_err
                    )
                })?;
                fs::remove_file(src)
                    .with_context(|| format!("Failed to remove {}", src.display()))?;
            }
        }
    }
    Ok(true)
}

fn copy(src: &Path, dst: &Path) -> Result<u64> {
    fs::copy(src, dst)
        .with_context(|| format!("Failed to copy {} to {}", src.display(), dst.display()))
}
