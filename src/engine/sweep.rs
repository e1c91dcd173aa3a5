//! Dead-link sweeping.
//!
//! Walks the deploy tree and removes symbolic links whose target can no
//! longer be resolved. Used by the clean, repair, and update flows — never
//! by plain deployment. The module store itself is pruned from the walk,
//! and symlinked directories are not descended into, so the sweep cannot
//! escape the deploy root through a link.

use std::fs;
use std::path::Path;

use crate::error::EngineError;

use super::Context;

/// Remove every broken symbolic link reachable under the deploy root.
///
/// Returns the number of links removed (or, in dry-run mode, the number
/// that would have been removed).
///
/// # Errors
///
/// Returns [`EngineError::Io`] if a directory cannot be read or a link
/// cannot be removed.
pub fn sweep(ctx: &Context) -> Result<u32, EngineError> {
    let mut removed = 0;
    sweep_dir(ctx, ctx.root(), &mut removed)?;
    Ok(removed)
}

fn sweep_dir(ctx: &Context, dir: &Path, removed: &mut u32) -> Result<(), EngineError> {
    let entries = fs::read_dir(dir).map_err(|e| EngineError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| EngineError::io(dir, e))?;
        let path = entry.path();
        let meta = fs::symlink_metadata(&path).map_err(|e| EngineError::io(&path, e))?;

        if meta.is_symlink() {
            // A link whose target cannot be stat'ed is dead.
            if fs::metadata(&path).is_err() {
                if ctx.config.dry_run {
                    ctx.log
                        .dry_run(&format!("would remove dead link: {}", path.display()));
                } else {
                    fs::remove_file(&path).map_err(|e| EngineError::io(&path, e))?;
                    ctx.log
                        .debug(&format!("removed dead link: {}", path.display()));
                }
                *removed += 1;
            }
        } else if meta.is_dir() && path != ctx.config.store {
            sweep_dir(ctx, &path, removed)?;
        }
    }
    Ok(())
}
