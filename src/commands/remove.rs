//! The `remove` command.
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::{GlobalOpts, ModuleOpts};
use crate::engine::sweep;
use crate::logging::Logger;

use super::CommandSetup;

/// Delete a module from the store, then sweep the dead links it leaves
/// behind.
///
/// # Errors
///
/// Returns an error if the module does not exist, cannot be deleted, or the
/// sweep fails.
pub fn run(global: &GlobalOpts, opts: &ModuleOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, Arc::clone(log))?;
    let module = setup.workspace.module(&opts.module)?;

    if setup.ctx.config.dry_run {
        log.dry_run(&format!("would remove module {}", module.name));
        return Ok(());
    }

    log.stage(&format!("Removing {}", module.name));
    std::fs::remove_dir_all(&module.dir)
        .with_context(|| format!("removing module directory: {}", module.dir.display()))?;

    let removed = sweep::sweep(&setup.ctx)?;
    log.info(&format!(
        "module removed, {removed} dead links swept"
    ));
    Ok(())
}
