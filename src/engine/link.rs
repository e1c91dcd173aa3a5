//! Link/copy materialization with conflict resolution.
//!
//! In link mode the on-disk link value is always computed relative to the
//! destination's parent directory, so links stay valid when the project tree
//! moves. The conflict policy is non-destructive by default: a destination
//! occupied by anything other than a symlink is an error unless force mode
//! is enabled, while a stale or dangling symlink is replaced unconditionally
//! (that is how re-deployment after a source move self-heals).

use std::fs;
use std::io;
use std::path::Path;

use crate::error::EngineError;

use super::{Config, relpath};

/// Outcome of applying one resolved mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The destination was created fresh.
    Created,
    /// An existing destination was removed and recreated.
    Replaced,
    /// The destination already held the correct link; nothing was touched.
    AlreadyCorrect,
    /// Dry-run mode: a change would have been made.
    WouldChange,
}

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
fn ensure_parent_dir(path: &Path) -> Result<(), EngineError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| EngineError::io(parent, e))?;
    }
    Ok(())
}

/// Recursively copy a directory tree. Symlinks within the source tree are
/// followed, so their content is materialised rather than the link itself.
fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<(), EngineError> {
    fs::create_dir_all(dst).map_err(|e| EngineError::io(dst, e))?;
    let entries = fs::read_dir(src).map_err(|e| EngineError::io(src, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| EngineError::io(src, e))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path).map_err(|e| EngineError::io(&dst_path, e))?;
        }
    }
    Ok(())
}

/// Copy `src` to `dest`, recursing for directories.
fn copy_into_place(src: &Path, dest: &Path) -> Result<(), EngineError> {
    if src.is_dir() {
        copy_dir_recursive(src, dest)
    } else {
        fs::copy(src, dest)
            .map(|_| ())
            .map_err(|e| EngineError::io(dest, e))
    }
}

/// Check if metadata represents a directory-like entry.
/// On Windows, `symlink_metadata().is_dir()` returns `false` for directory
/// symlinks, so we check the raw `FILE_ATTRIBUTE_DIRECTORY` bit instead.
fn is_dir_like(meta: &fs::Metadata) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        meta.file_attributes() & 0x10 != 0 // FILE_ATTRIBUTE_DIRECTORY
    }
    #[cfg(not(windows))]
    {
        meta.is_dir()
    }
}

/// Remove the symlink at `path`, handling platform differences.
fn remove_link(path: &Path, meta: &fs::Metadata) -> Result<(), EngineError> {
    if is_dir_like(meta) {
        fs::remove_dir(path).map_err(|e| EngineError::io(path, e))
    } else {
        fs::remove_file(path).map_err(|e| EngineError::io(path, e))
    }
}

/// Create a symlink at `dest` whose value is `value` (platform-specific).
///
/// `src` is only consulted on Windows to choose between file and directory
/// symlink flavours.
fn create_symlink(value: &Path, src: &Path, dest: &Path) -> Result<(), EngineError> {
    #[cfg(unix)]
    {
        let _ = src;
        std::os::unix::fs::symlink(value, dest).map_err(|e| EngineError::io(dest, e))
    }

    #[cfg(windows)]
    {
        if src.is_dir() {
            std::os::windows::fs::symlink_dir(value, dest).map_err(|e| EngineError::io(dest, e))
        } else {
            std::os::windows::fs::symlink_file(value, dest).map_err(|e| EngineError::io(dest, e))
        }
    }
}

/// Apply one resolved `(src, dest)` mapping under the configured policy.
///
/// Both paths must be absolute. In link mode the stored link value is the
/// path of `src` relative to `dest`'s parent directory; in copy mode `src`
/// is copied recursively.
///
/// # Errors
///
/// Returns [`EngineError::Conflict`] when `dest` is occupied by a
/// non-symlink and force mode is off, or [`EngineError::Io`] for any
/// filesystem failure.
pub fn apply(config: &Config, src: &Path, dest: &Path) -> Result<ApplyOutcome, EngineError> {
    let link_value = (!config.copy).then(|| {
        let parent = dest.parent().unwrap_or_else(|| Path::new("."));
        relpath::relative_from(parent, src)
    });

    let mut replaced = false;
    match fs::symlink_metadata(dest) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(EngineError::io(dest, e)),
        Ok(meta) if meta.is_symlink() => {
            let existing = fs::read_link(dest).map_err(|e| EngineError::io(dest, e))?;
            // A dangling link can never legitimately match; replace it even
            // when the stored value happens to be equal.
            let dangling = !dest.exists();
            if !dangling && link_value.as_deref() == Some(existing.as_path()) {
                return Ok(ApplyOutcome::AlreadyCorrect);
            }
            if config.dry_run {
                return Ok(ApplyOutcome::WouldChange);
            }
            remove_link(dest, &meta)?;
            replaced = true;
        }
        Ok(meta) => {
            let kind = if meta.is_dir() { "directory" } else { "file" };
            if !config.force {
                return Err(EngineError::Conflict {
                    dest: dest.to_path_buf(),
                    kind: kind.to_string(),
                });
            }
            if config.dry_run {
                return Ok(ApplyOutcome::WouldChange);
            }
            if meta.is_dir() {
                fs::remove_dir_all(dest).map_err(|e| EngineError::io(dest, e))?;
            } else {
                fs::remove_file(dest).map_err(|e| EngineError::io(dest, e))?;
            }
            replaced = true;
        }
    }

    if config.dry_run {
        return Ok(ApplyOutcome::WouldChange);
    }

    ensure_parent_dir(dest)?;
    match link_value {
        Some(value) => create_symlink(&value, src, dest)?,
        None => copy_into_place(src, dest)?,
    }

    Ok(if replaced {
        ApplyOutcome::Replaced
    } else {
        ApplyOutcome::Created
    })
}
