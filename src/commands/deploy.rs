//! The `deploy` and `deploy-all` commands.
use std::sync::Arc;

use anyhow::{Result, bail};

use crate::cli::{DeployOpts, GlobalOpts};
use crate::engine::apply;
use crate::logging::Logger;

use super::{CommandSetup, deploy_and_record, finish_batch, set_basedir_override};

/// Deploy a single module's manifest. Errors are immediate and fatal.
///
/// # Errors
///
/// Returns an error if the module is missing, has no manifest, or its
/// manifest application fails.
pub fn run(global: &GlobalOpts, opts: &DeployOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, Arc::clone(log))?;
    let module = setup.workspace.module(&opts.module)?;

    if let Some(basedir) = &opts.basedir {
        set_basedir_override(&setup.ctx, &module, basedir)?;
    }

    if !module.has_manifest() {
        bail!("module '{}' has no manifest", module.name);
    }

    log.stage(&format!("Deploying {}", module.name));
    let stats = apply::deploy_module_dir(&setup.ctx, &module.dir)?;
    log.info(&stats.summary());
    Ok(())
}

/// Deploy every module sequentially, counting per-module failures.
///
/// # Errors
///
/// Returns an error with the failure count when any module fails.
pub fn run_all(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, Arc::clone(log))?;

    for module in setup.workspace.modules()? {
        deploy_and_record(&setup.ctx, &module);
    }

    finish_batch(log)
}
