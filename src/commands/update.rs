//! The `update` and `update-all` commands.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::{GlobalOpts, ModuleOpts};
use crate::engine::{apply, sweep};
use crate::logging::{Logger, ModuleStatus};
use crate::vcs::{self, VcsKind};

use super::{CommandSetup, deploy_and_record, finish_batch};

/// Update one module from version control, then redeploy it.
///
/// A module that is not a checkout is redeployed without updating.
///
/// # Errors
///
/// Returns an error if the VCS command or the deployment fails.
pub fn run(global: &GlobalOpts, opts: &ModuleOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, Arc::clone(log))?;
    let module = setup.workspace.module(&opts.module)?;

    if VcsKind::detect(&module.dir).is_some() {
        log.stage(&format!("Updating {}", module.name));
        vcs::update(setup.ctx.executor.as_ref(), &module.dir)?;
    } else {
        log.warn(&format!("{} is not a checkout, deploying only", module.name));
    }

    log.stage(&format!("Deploying {}", module.name));
    let stats = apply::deploy_module_dir(&setup.ctx, &module.dir)?;
    log.info(&stats.summary());
    Ok(())
}

/// Update and redeploy every module, then sweep dead links.
///
/// One module's failure is counted and does not prevent the rest.
///
/// # Errors
///
/// Returns an error with the failure count when any module fails.
pub fn run_all(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, Arc::clone(log))?;

    for module in setup.workspace.modules()? {
        if VcsKind::detect(&module.dir).is_some() {
            log.stage(&format!("Updating {}", module.name));
            if let Err(e) = vcs::update(setup.ctx.executor.as_ref(), &module.dir) {
                log.error(&format!("{}: {e}", module.name));
                log.record_module(&module.name, ModuleStatus::Failed, Some(&e.to_string()));
                continue;
            }
        } else {
            log.debug(&format!("{} is not a checkout, deploying only", module.name));
        }
        deploy_and_record(&setup.ctx, &module);
    }

    log.stage("Sweeping dead links");
    let removed = sweep::sweep(&setup.ctx)?;
    log.info(&format!("{removed} dead links removed"));

    finish_batch(log)
}
