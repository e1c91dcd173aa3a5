//! The `repair` command.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::engine::{basedir, sweep};
use crate::logging::Logger;

use super::{CommandSetup, deploy_and_record, finish_batch};

/// Rebuild all links from scratch without touching version control.
///
/// Dead links are swept first; then every module's nested base-directory
/// markers are cleared (so imported submodules re-derive their base from
/// the current import graph instead of stale prior state) and the module is
/// redeployed.
///
/// # Errors
///
/// Returns an error with the failure count when any module fails.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, Arc::clone(log))?;

    log.stage("Sweeping dead links");
    let removed = sweep::sweep(&setup.ctx)?;
    log.info(&format!("{removed} dead links removed"));

    for module in setup.workspace.modules()? {
        if !setup.ctx.config.dry_run {
            let cleared = basedir::clear(&module.dir)?;
            if cleared > 0 {
                log.debug(&format!(
                    "{}: cleared {cleared} nested base-directory markers",
                    module.name
                ));
            }
        }
        deploy_and_record(&setup.ctx, &module);
    }

    finish_batch(log)
}
