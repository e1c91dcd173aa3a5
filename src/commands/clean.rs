//! The `clean` command.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::engine::sweep;
use crate::logging::Logger;

use super::CommandSetup;

/// Sweep dead symlinks under the project root.
///
/// # Errors
///
/// Returns an error if the workspace cannot be resolved or the sweep fails.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, Arc::clone(log))?;

    log.stage("Sweeping dead links");
    let removed = sweep::sweep(&setup.ctx)?;
    if setup.ctx.config.dry_run {
        log.info(&format!("{removed} dead links would be removed"));
    } else {
        log.info(&format!("{removed} dead links removed"));
    }
    Ok(())
}
